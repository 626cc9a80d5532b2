pub mod board;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod sheets;

pub use board::{
    filter_and_group, name_from_email, normalize_status, panel_key, BoardFilter, DisplayRow,
    PanelGroup, Round,
};
pub use cache::{BoardCache, Snapshot};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    ServerConfig, SheetsConfig,
};
pub use sheets::{parse_csv, Row, SheetData, SheetError, SheetsFetcher};
