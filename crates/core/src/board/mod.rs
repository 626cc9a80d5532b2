//! Panel aggregation: turns raw round rows into the per-panel display feed.
//!
//! Everything here is pure and synchronous; the request layer calls
//! [`filter_and_group`] against whichever cached snapshot it wants. The
//! ordering rules are deliberate and easy to get subtly wrong:
//!
//! - ongoing rows keep their source order;
//! - the single "be ready" row is the row right after the last ongoing one
//!   in the raw panel group, but its insertion position in the display list
//!   is relative to how many ongoing rows actually passed the filter;
//! - a panel with nothing to display still surfaces when every interview in
//!   it is over, so the UI can render a completion state.

mod types;

pub use types::{
    BoardFilter, DisplayRow, PanelGroup, Round, ROUND1_PANEL_COLUMNS, ROUND2_PANEL_COLUMNS,
};

use std::collections::BTreeMap;

use crate::sheets::Row;

/// Panel column candidates across both rounds, in priority order.
const PANEL_COLUMNS: &[&str] = &[
    "Round 1 Panel",
    "Round1 Panel",
    "Round1Panel",
    "Round 2 Panel",
    "Round2 Panel",
    "Round2Panel",
    "Panelist Name - Room",
    "Panel",
    "panel",
];

const STATUS_COLUMN: &str = "Status";
const ONGOING: &str = "ongoing";
const BE_READY: &str = "beready";
const BE_READY_LABEL: &str = "Be Ready";

/// Normalize a raw status cell: lowercase, strip whitespace and hyphens.
///
/// Idempotent; "On-Going", "ongoing " and "OnGoing" all map to "ongoing".
/// Empty input stays empty; the empty-means-pending rule is applied at the
/// point of filter matching.
pub fn normalize_status(status: &str) -> String {
    status
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Panel identity for a row: first non-empty value among the recognized
/// panel columns, trimmed. Rows without one are excluded from grouping.
pub fn panel_key(row: &Row) -> Option<&str> {
    row.first_non_empty(PANEL_COLUMNS)
}

/// Derive a human name from an email's local part: split on `.`/`_`/`-`,
/// title-case each segment, join with spaces. "Unknown" when unusable.
pub fn name_from_email(email: Option<&str>) -> String {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return "Unknown".to_string();
    };

    let local = email.split('@').next().unwrap_or("");
    let name = local
        .split(['.', '_', '-'])
        .filter(|segment| !segment.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name
    }
}

fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn row_status(row: &Row) -> String {
    normalize_status(row.get(STATUS_COLUMN).unwrap_or(""))
}

/// Normalized status with the empty-means-pending rule applied.
fn effective_status(row: &Row) -> String {
    let status = row_status(row);
    if status.is_empty() {
        "pending".to_string()
    } else {
        status
    }
}

/// Group rows by panel and build each panel's ordered display feed.
///
/// Panels come out in ascending lexicographic order of their identity. See
/// the module docs for the ordering and insertion rules.
pub fn filter_and_group(rows: &[Row], filter: &BoardFilter) -> Vec<PanelGroup> {
    // Grouping preserves source order within each panel; the BTreeMap keeps
    // panels sorted by identity.
    let mut groups: BTreeMap<String, Vec<&Row>> = BTreeMap::new();
    for row in rows {
        if let Some(panel) = panel_key(row) {
            groups.entry(panel.to_string()).or_default().push(row);
        }
    }

    let mut result = Vec::new();
    for (panel, panel_rows) in groups {
        if let Some(group) = build_panel(panel, &panel_rows, filter) {
            result.push(group);
        }
    }
    result
}

fn build_panel(panel: String, panel_rows: &[&Row], filter: &BoardFilter) -> Option<PanelGroup> {
    let ongoing_idxs: Vec<usize> = panel_rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row_status(row) == ONGOING)
        .map(|(i, _)| i)
        .collect();
    let has_ongoing = !ongoing_idxs.is_empty();

    // The be-ready candidate is the row right after the last ongoing one in
    // the raw group, when such a row exists.
    let be_ready_idx = ongoing_idxs
        .last()
        .map(|last| last + 1)
        .filter(|idx| *idx < panel_rows.len());

    let all_over =
        (has_ongoing && be_ready_idx.is_none()) || (!panel_rows.is_empty() && !has_ongoing);

    // Display list as indices into the panel group, in presentation order.
    let mut display: Vec<usize> = Vec::new();

    if filter.contains(ONGOING) {
        display.extend(ongoing_idxs.iter().copied());
    }

    let mut inserted_be_ready = None;
    if filter.contains(BE_READY) && has_ongoing {
        if let Some(idx) = be_ready_idx {
            // Insertion position is relative to the ongoing rows that made
            // it into the display, not the raw ongoing count; with
            // "ongoing" filtered out this lands at position 0.
            let ongoing_in_display = display
                .iter()
                .filter(|&&i| row_status(panel_rows[i]) == ONGOING)
                .count();
            display.insert(ongoing_in_display, idx);
            inserted_be_ready = Some(idx);
        }
    }

    for (i, row) in panel_rows.iter().enumerate() {
        let status = effective_status(row);
        let is_ongoing = status == ONGOING;
        let is_be_ready = be_ready_idx == Some(i);
        if !is_ongoing && !is_be_ready && filter.contains(&status) {
            display.push(i);
        }
    }

    // A panel with nothing to display only surfaces once every interview in
    // it is over.
    if display.is_empty() && !all_over {
        return None;
    }

    let mut items = Vec::with_capacity(display.len());
    for &i in &display {
        let row = panel_rows[i];
        let raw_status = row.get(STATUS_COLUMN).unwrap_or("");
        let show_as_be_ready = inserted_be_ready == Some(i);
        let display_status = if show_as_be_ready {
            BE_READY_LABEL.to_string()
        } else {
            raw_status.to_string()
        };

        let name = match row.get("Name").map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => name_from_email(row.get("Email")),
        };

        items.push(DisplayRow {
            fields: (*row).clone(),
            name,
            display_status,
            show_as_be_ready,
            normalized_status: effective_status(row),
        });
    }

    let ongoing_count = items
        .iter()
        .filter(|item| item.normalized_status == ONGOING)
        .count();
    let other_count = items.len() - ongoing_count;

    Some(PanelGroup {
        panel,
        items,
        ongoing_count,
        other_count,
        all_over,
    })
}
