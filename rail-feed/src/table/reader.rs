//! Line tokenizer with per-line quote state.

use std::sync::Arc;
use std::vec;

use csv::StringRecord;
use tracing::trace;

/// Byte-order mark some exporters put in front of the header.
const BOM: char = '\u{feff}';

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// A single row of a table, addressable by column name.
///
/// Rows shorter than the header read as empty strings for the missing
/// columns. Extra trailing fields are kept but unreachable by name.
#[derive(Debug, Clone)]
pub struct Record {
    columns: Arc<[String]>,
    fields: StringRecord,
}

impl Record {
    /// Returns the value stored under `column`.
    ///
    /// Unknown columns and fields past the end of a short row read as `""`.
    pub fn get(&self, column: &str) -> &str {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.fields.get(i))
            .unwrap_or("")
    }

    /// Returns the value under `column` if it is present and non-empty.
    pub fn get_opt(&self, column: &str) -> Option<&str> {
        let value = self.get(column);
        (!value.is_empty()).then_some(value)
    }
}

/// Lazy sequence of [`Record`]s produced by [`parse`].
///
/// Each line is tokenized exactly once, when the iterator reaches it.
/// Lines the tokenizer rejects are counted in [`Rows::faults`] and skipped.
pub struct Rows {
    columns: Arc<[String]>,
    lines: vec::IntoIter<String>,
    faults: usize,
}

impl Rows {
    fn empty(faults: usize) -> Self {
        Self {
            columns: Arc::from(Vec::new()),
            lines: Vec::new().into_iter(),
            faults,
        }
    }

    /// Column names taken from the first non-blank line.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of lines skipped so far because they could not be tokenized.
    pub fn faults(&self) -> usize {
        self.faults
    }
}

impl Iterator for Rows {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            let line = self.lines.next()?;
            match tokenize(&line) {
                Some(fields) => {
                    return Some(Record {
                        columns: Arc::clone(&self.columns),
                        fields,
                    });
                }
                None => {
                    trace!(%line, "skipping line with unbalanced quote");
                    self.faults += 1;
                }
            }
        }
    }
}

/// Split one line into fields.
///
/// Every quote character flips the quoted state and is dropped; a delimiter
/// separates fields only outside quotes. The state never carries over to
/// the next line, and a line that ends inside quotes yields `None`.
fn tokenize(line: &str) -> Option<StringRecord> {
    let mut record = StringRecord::new();
    let mut field = String::new();
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            QUOTE => quoted = !quoted,
            DELIMITER if !quoted => {
                record.push_field(&field);
                field.clear();
            }
            _ => field.push(ch),
        }
    }

    if quoted {
        return None;
    }
    record.push_field(&field);
    Some(record)
}

/// Parse table text into rows keyed by the header line.
///
/// Blank lines are dropped before tokenizing, so a table that opens with
/// blank lines still finds its header.
pub fn parse(text: &str) -> Rows {
    let mut lines = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter();

    let Some(header) = lines.next() else {
        return Rows::empty(0);
    };

    let columns: Arc<[String]> = match tokenize(&header) {
        Some(header) => header
            .iter()
            .map(|c| c.trim_start_matches(BOM).trim().to_string())
            .collect(),
        None => {
            trace!(%header, "unreadable header line");
            return Rows::empty(1);
        }
    };

    Rows {
        columns,
        lines,
        faults: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_each_field() {
        let rows: Vec<_> = parse("stop_id,stop_name\nS1,Cagliari\nS2,Sassari\n").collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("stop_id"), "S1");
        assert_eq!(rows[0].get("stop_name"), "Cagliari");
        assert_eq!(rows[1].get("stop_name"), "Sassari");
    }

    #[test]
    fn quoted_field_keeps_delimiter() {
        let rows: Vec<_> =
            parse("\"stop_id\",\"stop_name\"\n\"S1\",\"Decimomannu, Stazione\"\n").collect();
        assert_eq!(rows[0].get("stop_id"), "S1");
        assert_eq!(rows[0].get("stop_name"), "Decimomannu, Stazione");
    }

    #[test]
    fn blank_lines_are_skipped_everywhere() {
        let text = "\n   \nstop_id,stop_name\n\nS1,A\n  \t \nS2,B\n\n";
        let rows = parse(text);
        assert_eq!(rows.columns(), ["stop_id", "stop_name"]);
        let rows: Vec<_> = rows.collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("stop_id"), "S2");
    }

    #[test]
    fn short_rows_fill_with_empty_strings() {
        let rows: Vec<_> = parse("a,b,c\n1\n1,2\n").collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("a"), "1");
        assert_eq!(rows[0].get("b"), "");
        assert_eq!(rows[0].get("c"), "");
        assert_eq!(rows[1].get("b"), "2");
        assert_eq!(rows[1].get("c"), "");
    }

    #[test]
    fn unknown_column_reads_empty() {
        let rows: Vec<_> = parse("a\n1\n").collect();
        assert_eq!(rows[0].get("missing"), "");
        assert_eq!(rows[0].get_opt("missing"), None);
        assert_eq!(rows[0].get_opt("a"), Some("1"));
    }

    #[test]
    fn crlf_and_bom_are_tolerated() {
        let rows: Vec<_> = parse("\u{feff}stop_id,stop_lat\r\nS1,39.2\r\n").collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("stop_id"), "S1");
        assert_eq!(rows[0].get("stop_lat"), "39.2");
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert_eq!(parse("").count(), 0);
        assert_eq!(parse("\n  \n").count(), 0);
        assert!(parse("  ").columns().is_empty());
    }

    #[test]
    fn unbalanced_quote_drops_only_its_line() {
        let text = "stop_id,stop_name,stop_lat,stop_lon\n\
                    S1,\"Bad,39,9\n\
                    S2,Good,39.5,9.5\n\
                    S3,Good,40,9\n";
        let mut rows = parse(text);
        let ids: Vec<_> = rows.by_ref().map(|r| r.get("stop_id").to_string()).collect();
        assert_eq!(ids, vec!["S2", "S3"]);
        assert_eq!(rows.faults(), 1);
    }

    #[test]
    fn quote_toggles_anywhere_in_a_field() {
        let rows: Vec<_> = parse("a,b\nx,ab\"c,d\"e\n").collect();
        assert_eq!(rows[0].get("a"), "x");
        assert_eq!(rows[0].get("b"), "abc,de");
    }

    #[test]
    fn doubled_quote_is_two_toggles() {
        let rows: Vec<_> = parse("a\n\"say \"\"hi\"\"\"\n").collect();
        assert_eq!(rows[0].get("a"), "say hi");
    }

    #[test]
    fn unreadable_header_is_a_fault() {
        let rows = parse("\"a,b\n1,2\n");
        assert!(rows.columns().is_empty());
        assert_eq!(rows.faults(), 1);
    }

    #[test]
    fn header_only_has_no_rows() {
        let rows = parse("a,b\n");
        assert_eq!(rows.columns(), ["a", "b"]);
        assert_eq!(rows.count(), 0);
    }
}
