use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{ApiClient, Device, DeviceFilter, FilterOptions, Page};
use crate::config::Config;
use crate::error::Result;
use crate::list::{ListController, ListQuery, PageSource};
use crate::storage::{Database, Session};

/// Pages `/api/devices` for the signed-in user.
pub struct DeviceSource {
    api: ApiClient,
    db: Arc<Database>,
}

impl DeviceSource {
    pub fn new(api: ApiClient, db: Arc<Database>) -> Self {
        Self { api, db }
    }

    pub async fn filter_options(&self) -> Result<FilterOptions> {
        let session = Session::load(&self.db)?;
        self.api.device_filter_options(&session.token).await
    }
}

#[async_trait]
impl PageSource for DeviceSource {
    type Item = Device;
    type Filter = DeviceFilter;

    async fn fetch_page(&self, query: &ListQuery<DeviceFilter>) -> Result<Page<Device>> {
        let session = Session::load(&self.db)?;
        let page = self
            .api
            .list_devices(
                &session.token,
                &query.filter,
                &query.search,
                query.page,
                query.limit,
            )
            .await?;

        let inconsistent = page
            .items
            .iter()
            .filter(|d| !d.has_consistent_history())
            .count();
        if inconsistent > 0 {
            log::warn!(
                "{} device(s) on page {} have more than one open assignment",
                inconsistent,
                query.page
            );
        }
        Ok(page)
    }
}

pub type DeviceList = ListController<DeviceSource>;

pub fn device_list(api: ApiClient, db: Arc<Database>, config: &Config) -> Arc<DeviceList> {
    Arc::new(ListController::new(
        DeviceSource::new(api, db),
        "Devices",
        config.page_limit,
        config.search_debounce,
    ))
}
