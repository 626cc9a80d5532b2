use std::sync::Arc;

use panelboard_core::{BoardCache, Config, SanitizedConfig, SheetsFetcher};

/// Shared application state
pub struct AppState {
    config: Config,
    cache: Arc<BoardCache>,
    fetcher: Arc<SheetsFetcher>,
}

impl AppState {
    pub fn new(config: Config, cache: Arc<BoardCache>, fetcher: Arc<SheetsFetcher>) -> Self {
        Self {
            config,
            cache,
            fetcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn cache(&self) -> &BoardCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &SheetsFetcher {
        &self.fetcher
    }
}
