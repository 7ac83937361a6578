use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::Abortable;
use tokio::sync::{broadcast, RwLock};

use crate::alerts::{Alert, AlertHub};
use crate::api::{Identified, Page};
use crate::error::Result;

use super::debounce::Debouncer;
use super::in_flight::InFlight;
use super::state::*;

/// The `(filter, search, page)` tuple a single fetch asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<F> {
    pub filter: F,
    pub search: String,
    pub page: u32,
    pub limit: u32,
}

/// Where a list gets its pages from.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Item: Identified + Clone + Send + Sync + 'static;
    type Filter: Clone + Default + Send + Sync + 'static;

    async fn fetch_page(&self, query: &ListQuery<Self::Filter>) -> Result<Page<Self::Item>>;
}

struct ListState<T, F> {
    items: Vec<T>,
    pagination: PaginationState,
    phase: LoadPhase,
    filter: F,
    search: String,
}

/// Infinite-scroll list: page-1 resets, deduped load-more, debounced
/// search/filter, and stale-response rejection by request id.
pub struct ListController<S: PageSource> {
    source: S,
    title: String,
    state: RwLock<ListState<S::Item, S::Filter>>,
    latest_request: AtomicU64,
    in_flight: InFlight,
    debouncer: Debouncer,
    alerts: AlertHub,
}

impl<S: PageSource> ListController<S> {
    pub fn new(source: S, title: &str, limit: u32, debounce: Duration) -> Self {
        Self {
            source,
            title: title.to_string(),
            state: RwLock::new(ListState {
                items: Vec::new(),
                pagination: PaginationState::new(limit),
                phase: LoadPhase::Idle,
                filter: S::Filter::default(),
                search: String::new(),
            }),
            latest_request: AtomicU64::new(0),
            in_flight: InFlight::new(),
            debouncer: Debouncer::new(debounce),
            alerts: AlertHub::new(),
        }
    }

    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.alerts.subscribe()
    }

    pub async fn snapshot(&self) -> ListSnapshot<S::Item, S::Filter> {
        let st = self.state.read().await;
        ListSnapshot {
            items: st.items.clone(),
            pagination: st.pagination,
            phase: st.phase.clone(),
            filter: st.filter.clone(),
            search: st.search.clone(),
        }
    }

    pub async fn refresh(&self) -> Result<FetchOutcome> {
        self.fetch(true).await
    }

    pub async fn load_more(&self) -> Result<FetchOutcome> {
        self.fetch(false).await
    }

    /// Fetch page 1 (`reset`) or the next page. Only user-visible failures
    /// come back as `Err`; a failed load-more is logged and reported as
    /// [`FetchOutcome::LoadMoreFailed`].
    pub async fn fetch(&self, reset: bool) -> Result<FetchOutcome> {
        let (request_id, query, registration) = {
            let mut st = self.state.write().await;
            if !reset {
                if st.phase.is_busy() {
                    return Ok(FetchOutcome::Skipped);
                }
                if st.pagination.page == 0 || !st.pagination.has_next {
                    log::debug!("{}: no further pages", self.title);
                    return Ok(FetchOutcome::Skipped);
                }
            }

            let page = if reset { 1 } else { st.pagination.page + 1 };
            st.phase = if !reset {
                LoadPhase::LoadingMore
            } else if st.pagination.page == 0 && st.items.is_empty() {
                LoadPhase::Loading
            } else {
                LoadPhase::Refreshing
            };

            let request_id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
            let query = ListQuery {
                filter: st.filter.clone(),
                search: st.search.clone(),
                page,
                limit: st.pagination.limit,
            };
            (request_id, query, self.in_flight.begin(request_id))
        };

        log::debug!(
            "{}: request {} for page {} (search={:?})",
            self.title,
            request_id,
            query.page,
            query.search
        );

        let result = match Abortable::new(self.source.fetch_page(&query), registration).await {
            Ok(result) => result,
            Err(_) => {
                log::debug!("{}: request {} aborted", self.title, request_id);
                return Ok(FetchOutcome::Stale);
            }
        };
        self.in_flight.finish(request_id);

        let mut st = self.state.write().await;
        if self.latest_request.load(Ordering::SeqCst) != request_id {
            log::debug!("{}: discarding stale response {}", self.title, request_id);
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(page) => {
                if reset {
                    st.items.clear();
                }
                let added = merge_unique(&mut st.items, page.items);
                st.pagination.apply(&page.pagination, query.page);
                st.phase = LoadPhase::Ready;
                log::debug!(
                    "{}: page {} applied, {} new, {} held",
                    self.title,
                    st.pagination.page,
                    added,
                    st.items.len()
                );
                Ok(FetchOutcome::Applied { added })
            }
            Err(e) if reset => {
                // Held pages belong to the previous query; only a
                // successful reset may page further.
                st.pagination.has_next = false;
                st.phase = LoadPhase::Failed(e.user_message());
                drop(st);
                self.alerts.publish(Alert::from_error(&self.title, &e));
                Err(e)
            }
            Err(e) => {
                log::warn!("{}: load more failed: {}", self.title, e);
                st.phase = LoadPhase::Ready;
                Ok(FetchOutcome::LoadMoreFailed)
            }
        }
    }

    /// Swap a held item for the server's newer copy. Unknown ids are ignored.
    pub async fn replace_item(&self, item: S::Item) -> bool {
        let mut st = self.state.write().await;
        match st.items.iter_mut().find(|i| i.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub async fn remove_item(&self, id: &str) -> bool {
        let mut st = self.state.write().await;
        let before = st.items.len();
        st.items.retain(|i| i.id() != id);
        st.items.len() != before
    }

    /// Tear down: drop the pending debounce and abort the in-flight request.
    pub fn shutdown(&self) {
        self.debouncer.cancel();
        self.in_flight.abort();
        // Any response still on its way is now stale.
        self.latest_request.fetch_add(1, Ordering::SeqCst);
    }
}

impl<S: PageSource> ListController<S> {
    /// Update the search text now, fetch page 1 after the quiet period.
    pub async fn set_search(self: &Arc<Self>, text: &str) {
        {
            let mut st = self.state.write().await;
            if st.search == text {
                return;
            }
            st.search = text.to_string();
        }
        self.schedule_reset();
    }

    pub async fn set_filter(self: &Arc<Self>, filter: S::Filter) {
        self.state.write().await.filter = filter;
        self.schedule_reset();
    }

    fn schedule_reset(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.debouncer.call(async move {
            if let Some(controller) = weak.upgrade() {
                // Failures already raised an alert.
                let _ = controller.fetch(true).await;
            }
        });
    }
}
