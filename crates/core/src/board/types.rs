use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::sheets::Row;

use super::normalize_status;

/// Round-1 panel column candidates, in priority order.
pub const ROUND1_PANEL_COLUMNS: &[&str] = &["Round 1 Panel", "Round1 Panel", "Round1Panel"];

/// Round-2 panel column candidates, in priority order.
pub const ROUND2_PANEL_COLUMNS: &[&str] = &["Round 2 Panel", "Round2 Panel", "Round2Panel"];

/// One of the two interview stages, each with its own sheet and panel
/// column conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Round {
    Round1,
    Round2,
}

impl Round {
    /// Named sheet holding this round's rows.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Round::Round1 => "round1",
            Round::Round2 => "round2",
        }
    }

    /// Panel columns recognized for this round in the combined sheet.
    pub fn panel_columns(&self) -> &'static [&'static str] {
        match self {
            Round::Round1 => ROUND1_PANEL_COLUMNS,
            Round::Round2 => ROUND2_PANEL_COLUMNS,
        }
    }
}

/// Request-scoped board parameters: which round and which statuses to show.
#[derive(Debug, Clone)]
pub struct BoardFilter {
    /// Normalized status values to include.
    pub statuses: HashSet<String>,
    pub round: Round,
}

impl BoardFilter {
    /// Build a filter, normalizing each requested status.
    pub fn new<I, S>(round: Round, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let statuses = statuses
            .into_iter()
            .map(|s| normalize_status(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        Self { statuses, round }
    }

    /// Default filter: ongoing plus the be-ready slot.
    pub fn default_for(round: Round) -> Self {
        Self::new(round, ["ongoing", "beready"])
    }

    pub fn contains(&self, normalized_status: &str) -> bool {
        self.statuses.contains(normalized_status)
    }
}

/// One row of the display feed, carrying the original columns plus the
/// presentation fields the UI keys off.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    #[serde(flatten)]
    pub fields: Row,
    /// Candidate name, derived from the Email column when Name is missing.
    pub name: String,
    /// Raw status value, or the literal `"Be Ready"` for the inserted row.
    pub display_status: String,
    pub show_as_be_ready: bool,
    pub normalized_status: String,
}

/// Aggregated display feed for one panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelGroup {
    pub panel: String,
    pub items: Vec<DisplayRow>,
    pub ongoing_count: usize,
    pub other_count: usize,
    /// Every candidate resolved, or the last ongoing row has no successor.
    pub all_over: bool,
}
