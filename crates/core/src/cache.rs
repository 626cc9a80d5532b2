//! Snapshot cache shared between the refresh task and request handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::board::Round;
use crate::sheets::Row;

/// One immutable fetch result. Replaced wholesale on refresh so readers see
/// either the old or the new rows, never a partial mix.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub round1: Vec<Row>,
    pub round2: Vec<Row>,
    /// When this snapshot was fetched; None for the initial empty snapshot.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            round1: Vec::new(),
            round2: Vec::new(),
            fetched_at: None,
        }
    }

    pub fn rows(&self, round: Round) -> &[Row] {
        match round {
            Round::Round1 => &self.round1,
            Round::Round2 => &self.round2,
        }
    }
}

/// Holder for the current snapshot plus the single-refresh-in-flight guard.
pub struct BoardCache {
    snapshot: RwLock<Arc<Snapshot>>,
    refreshing: AtomicBool,
}

impl BoardCache {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            refreshing: AtomicBool::new(false),
        }
    }

    /// Current snapshot. Cheap to call; the Arc is cloned, not the rows.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Replace the snapshot atomically with freshly fetched rows.
    pub async fn replace(&self, round1: Vec<Row>, round2: Vec<Row>) {
        let next = Arc::new(Snapshot {
            round1,
            round2,
            fetched_at: Some(Utc::now()),
        });
        *self.snapshot.write().await = next;
    }

    /// Claim the refresh slot. Returns false when a refresh is already in
    /// flight, in which case the caller must no-op rather than queue.
    pub fn begin_refresh(&self) -> bool {
        self.refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Release the refresh slot.
    pub fn end_refresh(&self) {
        self.refreshing.store(false, Ordering::SeqCst);
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.fetched_at
    }
}

impl Default for BoardCache {
    fn default() -> Self {
        Self::new()
    }
}
