//! Board API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use panelboard_core::{filter_and_group, metrics, BoardFilter, PanelGroup, Round};

use crate::refresh::{refresh_once, RefreshOutcome};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    /// Which round's dataset to aggregate (default: round1).
    #[serde(default)]
    pub round: Option<Round>,
    /// Comma-separated status filter (default: "ongoing,beready").
    #[serde(default)]
    pub statuses: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub round: Round,
    pub panels: Vec<PanelGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub outcome: RefreshOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/board
///
/// Aggregate the cached snapshot for one round into the per-panel feed.
pub async fn get_board(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BoardQuery>,
) -> Json<BoardResponse> {
    let round = query.round.unwrap_or(Round::Round1);
    let filter = match &query.statuses {
        Some(statuses) => BoardFilter::new(round, statuses.split(',')),
        None => BoardFilter::default_for(round),
    };

    metrics::BOARD_REQUESTS
        .with_label_values(&[round.sheet_name()])
        .inc();

    let snapshot = state.cache().snapshot().await;
    let panels = filter_and_group(snapshot.rows(round), &filter);

    Json(BoardResponse {
        round,
        panels,
        last_updated: snapshot.fetched_at,
    })
}

/// POST /api/v1/refresh
///
/// Trigger a refresh cycle. A refresh already in flight makes this a no-op.
pub async fn trigger_refresh(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let outcome = refresh_once(&state).await;
    Json(RefreshResponse {
        outcome,
        last_updated: state.cache().last_updated().await,
    })
}
