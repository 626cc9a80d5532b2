use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Spreadsheet source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    /// Default spreadsheet document id. Fetch calls without an explicit id
    /// use this one; if neither is set the fetch fails.
    #[serde(default)]
    pub document_id: Option<String>,
    /// Document host base URL (default: https://docs.google.com).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// CORS proxy endpoint used as a per-attempt fallback route
    /// (default: https://api.allorigins.win/raw).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    /// Seconds between background refresh cycles (default: 30).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Per-request timeout in milliseconds (default: 15000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum fetch attempts per sheet (default: 2).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for linear retry backoff in milliseconds (default: 500).
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            document_id: None,
            base_url: None,
            proxy_url: None,
            refresh_interval_secs: default_refresh_interval(),
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_max_attempts() -> u32 {
    2
}

fn default_retry_base_delay() -> u64 {
    500
}

/// Sanitized config for API responses (document id redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub sheets: SanitizedSheetsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSheetsConfig {
    pub document_id_configured: bool,
    pub refresh_interval_secs: u64,
    pub timeout_ms: u64,
    pub max_attempts: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            sheets: SanitizedSheetsConfig {
                document_id_configured: config
                    .sheets
                    .document_id
                    .as_deref()
                    .is_some_and(|id| !id.is_empty()),
                refresh_interval_secs: config.sheets.refresh_interval_secs,
                timeout_ms: config.sheets.timeout_ms,
                max_attempts: config.sheets.max_attempts,
            },
        }
    }
}
