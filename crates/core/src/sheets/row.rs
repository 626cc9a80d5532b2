//! Row model for parsed sheet data.

use std::collections::BTreeMap;

use serde::Serialize;

use super::SheetError;

/// One spreadsheet line as a mapping from column name to trimmed cell value.
///
/// The column set varies by sheet and by round, so rows keep whatever
/// columns the source had; well-known columns are looked up by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    #[serde(flatten)]
    cells: BTreeMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from (column, value) pairs. Handy in tests and fixtures.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { cells }
    }

    /// Raw cell value for a column, if the column exists (may be empty).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells.get(key).map(String::as_str)
    }

    /// Whether the row has a column with this exact name.
    pub fn contains(&self, key: &str) -> bool {
        self.cells.contains_key(key)
    }

    /// Set a cell value, replacing any existing one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(key.into(), value.into());
    }

    /// First non-empty value among an ordered list of candidate columns.
    ///
    /// Candidates are evaluated in priority order; a cell counts only if it
    /// is present and non-empty after trimming. The returned value is
    /// trimmed.
    pub fn first_non_empty(&self, candidates: &[&str]) -> Option<&str> {
        candidates
            .iter()
            .filter_map(|key| self.get(key))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// True when every cell in the row is empty.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.is_empty())
    }
}

/// Parse a CSV body into rows.
///
/// The first record is the header; fields are trimmed; fully empty lines are
/// skipped. Ragged records are tolerated: extra fields are dropped, missing
/// columns are simply absent from the row.
pub fn parse_csv(text: &str) -> Result<Vec<Row>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| SheetError::Parse(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SheetError::Parse(e.to_string()))?;

        let row = Row::from_pairs(headers.iter().zip(record.iter()));
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}
