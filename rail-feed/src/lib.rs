//! Transit feed engine.
//!
//! Loads a GTFS-style feed (stops, shapes, trips, stop times, routes and
//! optional agency/calendar tables), derives the deduplicated set of rail
//! paths between terminal stations, and exposes the result as read-only
//! collections and GeoJSON features.

pub mod config;
pub mod feed;
pub mod geometry;
pub mod loader;
pub mod network;
pub mod spatial;
pub mod table;
pub mod web;
