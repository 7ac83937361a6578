use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{ApiClient, Page, Post};
use crate::config::Config;
use crate::error::Result;
use crate::list::{ListController, ListQuery, PageSource};
use crate::storage::{Database, Session};

/// Pages `/api/social/posts`. The feed has no filters or search.
pub struct FeedSource {
    api: ApiClient,
    db: Arc<Database>,
}

impl FeedSource {
    pub fn new(api: ApiClient, db: Arc<Database>) -> Self {
        Self { api, db }
    }
}

#[async_trait]
impl PageSource for FeedSource {
    type Item = Post;
    type Filter = ();

    async fn fetch_page(&self, query: &ListQuery<()>) -> Result<Page<Post>> {
        let session = Session::load(&self.db)?;
        self.api
            .list_posts(&session.token, query.page, query.limit)
            .await
    }
}

/// After a `PostThread` mutation, pass the returned post to
/// [`ListController::replace_item`] so the feed card shows the same aggregate.
pub type FeedList = ListController<FeedSource>;

pub fn feed_list(api: ApiClient, db: Arc<Database>, config: &Config) -> Arc<FeedList> {
    Arc::new(ListController::new(
        FeedSource::new(api, db),
        "Feed",
        config.page_limit,
        config.search_debounce,
    ))
}
