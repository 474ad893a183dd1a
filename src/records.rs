//! Comma-separated text records.
//!
//! The first line of every source is a header and is discarded. Double quotes
//! toggle quoting, so a quoted field may contain commas; the quote characters
//! themselves are dropped.

use std::fs;
use std::path::Path;

use crate::error::LoadError;

/// Fields beyond this are ignored.
pub const MAX_FIELDS: usize = 10;

/// One parsed line of a record source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the source, for diagnostics
    pub line: usize,
    pub fields: Vec<String>,
}

impl Record {
    /// Build a record from a single unparsed line.
    pub fn from_line(line: usize, text: &str) -> Self {
        Record { line, fields: split_fields(text) }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field `idx` with surrounding whitespace removed.
    pub fn field(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(|f| f.trim())
    }

    /// Field `idx` parsed as a signed integer.
    pub fn int(&self, idx: usize) -> Option<i64> {
        self.field(idx)?.parse().ok()
    }
}

/// Split one line into fields.
pub fn split_fields(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                if fields.len() == MAX_FIELDS {
                    return fields;
                }
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Parse a whole source: drop the header, skip blank lines.
pub fn parse_records(text: &str) -> Vec<Record> {
    text.lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| Record::from_line(idx + 1, line))
        .collect()
}

/// Read and parse a record file.
///
/// Invalid UTF-8 is replaced rather than rejected, so one bad byte only spoils
/// the record it sits in.
pub fn read_records(path: &Path) -> Result<Vec<Record>, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(LoadError::Empty { path: path.to_path_buf() });
    }

    let text = String::from_utf8_lossy(&bytes);
    Ok(parse_records(&text))
}
