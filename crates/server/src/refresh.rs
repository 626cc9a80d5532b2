//! Background snapshot refresh.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use panelboard_core::metrics::REFRESH_CYCLES;

use crate::state::AppState;

/// Result of one refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Snapshot replaced with freshly fetched rows.
    Refreshed,
    /// Another refresh was already in flight; this one was a no-op.
    Skipped,
    /// Fetching failed; the previous snapshot stays in place.
    Failed,
}

/// Run one refresh cycle, guarded so only a single refresh is in flight.
pub async fn refresh_once(state: &AppState) -> RefreshOutcome {
    if !state.cache().begin_refresh() {
        debug!("Refresh already in flight, skipping");
        REFRESH_CYCLES.with_label_values(&["skipped"]).inc();
        return RefreshOutcome::Skipped;
    }

    let outcome = match state.fetcher().fetch_rounds().await {
        Ok(data) => {
            let (r1, r2) = (data.round1.len(), data.round2.len());
            state.cache().replace(data.round1, data.round2).await;
            info!(round1_rows = r1, round2_rows = r2, "Snapshot refreshed");
            REFRESH_CYCLES.with_label_values(&["success"]).inc();
            RefreshOutcome::Refreshed
        }
        Err(e) => {
            warn!("Refresh failed, keeping previous snapshot: {}", e);
            REFRESH_CYCLES.with_label_values(&["failed"]).inc();
            RefreshOutcome::Failed
        }
    };

    state.cache().end_refresh();
    outcome
}

/// Spawn the periodic refresh task. The first cycle runs immediately.
pub fn spawn_refresh_loop(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(state.config().sheets.refresh_interval_secs);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            refresh_once(&state).await;
        }
    })
}
