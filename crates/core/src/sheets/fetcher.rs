//! CSV export retrieval with retry, proxy fallback and per-round composition.

use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::board::Round;
use crate::config::SheetsConfig;
use crate::metrics;

use super::row::{parse_csv, Row};
use super::SheetError;

/// Sheet name for the default (combined) sheet of a document.
pub const DEFAULT_SHEET: &str = "";

const DEFAULT_BASE_URL: &str = "https://docs.google.com";
const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/raw";

/// Canonical round-2 columns guaranteed present after normalization.
const ROUND2_CANONICAL_COLUMNS: &[&str] =
    &["Sr. No.", "Name", "Email", "Panelist Name - Room", "Status"];

/// Rows for both interview rounds, as retrieved in one refresh cycle.
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub round1: Vec<Row>,
    pub round2: Vec<Row>,
}

/// Client for a remote spreadsheet document's CSV export endpoint.
pub struct SheetsFetcher {
    client: Client,
    config: SheetsConfig,
    base_url: String,
    proxy_url: String,
}

impl SheetsFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: SheetsConfig) -> Result<Self, SheetError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let proxy_url = config
            .proxy_url
            .clone()
            .unwrap_or_else(|| DEFAULT_PROXY_URL.to_string());

        Ok(Self {
            client,
            config,
            base_url,
            proxy_url,
        })
    }

    /// CSV export URL for one sheet of a document.
    fn export_url(&self, document_id: &str, sheet_name: &str) -> String {
        format!(
            "{}/spreadsheets/d/{}/gviz/tq?tqx=out:csv&sheet={}",
            self.base_url.trim_end_matches('/'),
            document_id,
            urlencoding::encode(sheet_name)
        )
    }

    /// The same export routed through the CORS proxy endpoint.
    fn proxied_url(&self, export_url: &str) -> String {
        format!(
            "{}?url={}",
            self.proxy_url.trim_end_matches('/'),
            urlencoding::encode(export_url)
        )
    }

    async fn request_csv(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/csv")
            .send()
            .await?
            .error_for_status()?;
        response.text().await
    }

    /// Fetch one named sheet and parse it into rows.
    ///
    /// Each attempt tries the direct export URL first and the proxy route
    /// second; only when both fail does the attempt count as exhausted and a
    /// linear backoff (`attempt_index * retry_base_delay`) is applied before
    /// the next one. Timeouts count as failed sub-attempts.
    pub async fn fetch_sheet(
        &self,
        sheet_name: &str,
        document_id: Option<&str>,
    ) -> Result<Vec<Row>, SheetError> {
        let document_id = document_id
            .or(self.config.document_id.as_deref())
            .filter(|id| !id.is_empty())
            .ok_or(SheetError::NotConfigured)?;

        let export_url = self.export_url(document_id, sheet_name);
        let proxied_url = self.proxied_url(&export_url);
        let max_attempts = self.config.max_attempts.max(1);
        let started = Instant::now();

        let mut last_error = String::new();
        for attempt in 1..=max_attempts {
            match self.request_csv(&export_url).await {
                Ok(body) => {
                    return self.finish_fetch(sheet_name, &body, started, "direct");
                }
                Err(e) => {
                    debug!(sheet = sheet_name, attempt, "Direct fetch failed: {}", e);
                    last_error = e.to_string();
                }
            }

            match self.request_csv(&proxied_url).await {
                Ok(body) => {
                    return self.finish_fetch(sheet_name, &body, started, "proxy");
                }
                Err(e) => {
                    warn!(sheet = sheet_name, attempt, "Proxy fetch failed: {}", e);
                    last_error = e.to_string();
                }
            }

            metrics::SHEET_FETCH_ATTEMPTS
                .with_label_values(&["failed"])
                .inc();

            if attempt < max_attempts {
                let delay = Duration::from_millis(attempt as u64 * self.config.retry_base_delay_ms);
                debug!(sheet = sheet_name, attempt, "Backing off for {:?}", delay);
                sleep(delay).await;
            }
        }

        Err(SheetError::FetchFailed {
            sheet: sheet_name.to_string(),
            attempts: max_attempts,
            last_error,
        })
    }

    fn finish_fetch(
        &self,
        sheet_name: &str,
        body: &str,
        started: Instant,
        route: &str,
    ) -> Result<Vec<Row>, SheetError> {
        metrics::SHEET_FETCH_ATTEMPTS.with_label_values(&[route]).inc();
        metrics::SHEET_FETCH_DURATION
            .with_label_values(&[route])
            .observe(started.elapsed().as_secs_f64());

        let rows = parse_csv(body)?;
        metrics::SHEET_ROWS_FETCHED.observe(rows.len() as f64);
        debug!(sheet = sheet_name, rows = rows.len(), route, "Sheet fetched");
        Ok(rows)
    }

    /// Fetch both rounds' datasets for one refresh cycle.
    ///
    /// Round fetches run concurrently and fail independently: a round whose
    /// named sheet is unavailable falls back to the default sheet filtered
    /// by that round's panel columns. Only when the fallback also fails does
    /// the cycle surface an error; a fallback yielding zero rows is an empty
    /// round, not a failure.
    pub async fn fetch_rounds(&self) -> Result<SheetData, SheetError> {
        let (round1, round2) =
            tokio::join!(self.fetch_round(Round::Round1), self.fetch_round(Round::Round2));

        let data = SheetData {
            round1: round1?,
            round2: round2?,
        };
        info!(
            round1_rows = data.round1.len(),
            round2_rows = data.round2.len(),
            "Fetched both rounds"
        );
        Ok(data)
    }

    async fn fetch_round(&self, round: Round) -> Result<Vec<Row>, SheetError> {
        match self.fetch_sheet(round.sheet_name(), None).await {
            Ok(rows) => Ok(match round {
                Round::Round1 => rows,
                Round::Round2 => normalize_round2_rows(rows),
            }),
            Err(e) => {
                warn!(
                    sheet = round.sheet_name(),
                    "Named sheet unavailable ({}), trying combined-sheet fallback", e
                );
                let combined = self.fetch_sheet(DEFAULT_SHEET, None).await?;
                let rows: Vec<Row> = combined
                    .into_iter()
                    .filter(|row| row.first_non_empty(round.panel_columns()).is_some())
                    .collect();
                debug!(
                    sheet = round.sheet_name(),
                    rows = rows.len(),
                    "Fallback rows filtered from combined sheet"
                );
                Ok(rows)
            }
        }
    }
}

/// Remap round-2 rows so the canonical columns are always present.
///
/// Email falls back to the lowercase `email` column and defaults to empty;
/// all original columns are preserved alongside the canonical ones.
pub fn normalize_round2_rows(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter()
        .map(|mut row| {
            let email = row
                .get("Email")
                .filter(|v| !v.is_empty())
                .or_else(|| row.get("email"))
                .unwrap_or("")
                .to_string();
            row.set("Email", email);
            for column in ROUND2_CANONICAL_COLUMNS {
                if !row.contains(column) {
                    row.set(*column, "");
                }
            }
            row
        })
        .collect()
}
