pub mod alerts;
pub mod api;
pub mod config;
pub mod devices;
pub mod emoji;
pub mod error;
pub mod list;
pub mod logging;
pub mod notifications;
pub mod social;
pub mod storage;

use std::sync::Arc;

pub use alerts::Alert;
pub use config::Config;
pub use error::{ApiError, Result};

/// Everything a UI shell needs, wired from one config.
pub struct AppCore {
    pub config: Config,
    pub api: api::ApiClient,
    pub db: Arc<storage::Database>,
}

impl AppCore {
    pub fn new(config: Config) -> Result<Self> {
        logging::init(&config.data_dir);
        let api = api::ApiClient::from_config(&config)?;
        let db = Arc::new(storage::Database::open(&config.data_dir)?);
        log::info!("API base URL: {}", api.base_url());
        Ok(Self { config, api, db })
    }

    pub fn session(&self) -> Result<storage::Session> {
        storage::Session::load(&self.db)
    }

    pub fn device_list(&self) -> Arc<devices::DeviceList> {
        devices::device_list(self.api.clone(), self.db.clone(), &self.config)
    }

    pub fn device_detail(&self) -> devices::DeviceDetail {
        devices::DeviceDetail::new(self.api.clone(), self.db.clone())
    }

    pub fn feed(&self) -> Arc<social::FeedList> {
        social::feed_list(self.api.clone(), self.db.clone(), &self.config)
    }

    pub async fn open_post(&self, post_id: &str) -> Result<social::PostThread<api::ApiClient>> {
        social::PostThread::open(Arc::new(self.api.clone()), self.db.clone(), post_id).await
    }

    pub fn post_thread(&self, post: api::Post) -> social::PostThread<api::ApiClient> {
        social::PostThread::new(Arc::new(self.api.clone()), self.db.clone(), post)
    }
}
