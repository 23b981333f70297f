//! Per-session classification memo.
//!
//! Presentation consumers re-derive classification on every refresh tick,
//! and several consumers may share one tick. The original dashboard memoized
//! the derived state per component; the port is an explicit one-slot cache
//! the session owns and passes by reference — never a module-level
//! singleton. Inputs are immutable once captured, so the key tuple is the
//! entire invalidation protocol.

use crate::classify::{classify, Classification};
use crate::event::CalendarEvent;

/// One-slot memo of [`classify`] keyed by
/// `(events_version, now_ms, window_ms)`.
///
/// The caller owns versioning: bump `events_version` whenever the fetched
/// event list is replaced. The cache trusts the version and does not inspect
/// the list itself, so reusing a version for a different list returns stale
/// results by contract.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    key: Option<(u64, i64, i64)>,
    value: Classification,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify through the memo: recompute when any key component changed,
    /// return the cached result otherwise.
    pub fn classify(
        &mut self,
        events_version: u64,
        events: &[CalendarEvent],
        now_ms: i64,
        window_ms: i64,
    ) -> &Classification {
        let key = (events_version, now_ms, window_ms);
        if self.key != Some(key) {
            self.value = classify(events, now_ms, window_ms);
            self.key = Some(key);
        }
        &self.value
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
