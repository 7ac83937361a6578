use std::collections::HashSet;

use crate::api::{Identified, Pagination};

/// Client-side view of the server's pagination block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// Last page successfully applied; 0 before the first load.
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    /// Copied from the server, never recomputed locally.
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationState {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 0,
            limit,
            total: 0,
            has_next: false,
            has_prev: false,
        }
    }

    /// Adopt the server's pagination after a successful fetch of `requested`.
    pub fn apply(&mut self, server: &Pagination, requested: u32) {
        self.page = if server.page > 0 { server.page } else { requested };
        if server.limit > 0 {
            self.limit = server.limit;
        }
        self.total = server.total;
        self.has_next = server.has_next;
        self.has_prev = server.has_prev;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    /// First page, nothing shown yet.
    Loading,
    /// Reset fetch while a list is already shown (pull-to-refresh, new search).
    Refreshing,
    LoadingMore,
    Ready,
    Failed(String),
}

impl LoadPhase {
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            LoadPhase::Loading | LoadPhase::Refreshing | LoadPhase::LoadingMore
        )
    }
}

/// What the UI gets to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T, F> {
    pub items: Vec<T>,
    pub pagination: PaginationState,
    pub phase: LoadPhase,
    pub filter: F,
    pub search: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Response applied; `added` items are new to the list.
    Applied { added: usize },
    /// Superseded by a newer request; nothing changed.
    Stale,
    /// No request was made (no next page, or a fetch is already running).
    Skipped,
    /// A load-more failed; the list is unchanged and scrolling retries.
    LoadMoreFailed,
}

/// Append the items of `incoming` whose id is not already held. Keeps the
/// first occurrence, including for duplicates inside `incoming` itself.
pub fn merge_unique<T: Identified>(existing: &mut Vec<T>, incoming: Vec<T>) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|i| i.id().to_string()).collect();
    let before = existing.len();
    for item in incoming {
        if seen.insert(item.id().to_string()) {
            existing.push(item);
        }
    }
    existing.len() - before
}
