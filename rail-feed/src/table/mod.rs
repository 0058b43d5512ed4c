//! Delimited table parsing.
//!
//! Feed tables are comma-separated text with a header row. A double quote
//! switches quoted mode on or off, and commas inside quoted mode belong to
//! the field. Each line is tokenized on its own, so a stray quote can only
//! spoil its own line. Lines that are empty after trimming are ignored
//! everywhere, including before the header.

mod reader;

pub use reader::{Record, Rows, parse};
