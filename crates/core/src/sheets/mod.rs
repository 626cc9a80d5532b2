//! Spreadsheet ingestion: CSV export retrieval and row parsing.
//!
//! The remote document host exposes each sheet as a CSV export. Retrieval
//! goes through a direct request first and falls back to a CORS proxy route
//! within the same attempt; attempts are retried with linear backoff.

mod fetcher;
mod row;

pub use fetcher::{normalize_round2_rows, SheetData, SheetsFetcher, DEFAULT_SHEET};
pub use row::{parse_csv, Row};

use thiserror::Error;

/// Errors that can occur while retrieving or parsing sheet data.
#[derive(Debug, Error)]
pub enum SheetError {
    /// No document id resolvable (neither explicit nor configured).
    #[error("No spreadsheet document id configured")]
    NotConfigured,

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// All retrieval attempts exhausted, direct and proxy routes included.
    #[error("Failed to fetch sheet \"{sheet}\" after {attempts} attempts: {last_error}")]
    FetchFailed {
        sheet: String,
        attempts: u32,
        last_error: String,
    },

    /// Malformed CSV body. No partial-row recovery is attempted.
    #[error("Failed to parse CSV: {0}")]
    Parse(String),
}
