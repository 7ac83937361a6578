use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{ApiError, Result};

use super::types::*;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── Devices ─────────────────────────────────────────────────────────

    pub async fn list_devices(
        &self,
        token: &str,
        filter: &DeviceFilter,
        search: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Device>> {
        let mut req = self
            .client
            .get(self.url("/api/devices"))
            .bearer_auth(token)
            .query(&[("page", page), ("limit", limit)])
            .query(filter);
        let search = search.trim();
        if !search.is_empty() {
            req = req.query(&[("search", search)]);
        }
        send_json(req).await
    }

    pub async fn device_filter_options(&self, token: &str) -> Result<FilterOptions> {
        let req = self
            .client
            .get(self.url("/api/devices/filter-options"))
            .bearer_auth(token);
        send_json(req).await
    }

    pub async fn get_device(&self, token: &str, device_id: &str) -> Result<Device> {
        let req = self
            .client
            .get(self.url(&format!("/api/devices/{}", device_id)))
            .bearer_auth(token);
        send_json(req).await
    }

    pub async fn assign_device(
        &self,
        token: &str,
        device_id: &str,
        user_ids: &[String],
    ) -> Result<Device> {
        let req = self
            .client
            .post(self.url(&format!("/api/devices/{}/assign", device_id)))
            .bearer_auth(token)
            .json(&AssignDeviceRequest {
                user_ids: user_ids.to_vec(),
            });
        send_json(req).await
    }

    pub async fn revoke_device(&self, token: &str, device_id: &str) -> Result<Device> {
        let req = self
            .client
            .post(self.url(&format!("/api/devices/{}/revoke", device_id)))
            .bearer_auth(token);
        send_json(req).await
    }

    pub async fn update_device_status(
        &self,
        token: &str,
        device_id: &str,
        status: DeviceStatus,
    ) -> Result<Device> {
        let req = self
            .client
            .put(self.url(&format!("/api/devices/{}/status", device_id)))
            .bearer_auth(token)
            .json(&UpdateStatusRequest { status });
        send_json(req).await
    }

    // ── Social ──────────────────────────────────────────────────────────

    pub async fn list_posts(&self, token: &str, page: u32, limit: u32) -> Result<Page<Post>> {
        let req = self
            .client
            .get(self.url("/api/social/posts"))
            .bearer_auth(token)
            .query(&[("page", page), ("limit", limit)]);
        send_json(req).await
    }

    pub async fn get_post(&self, token: &str, post_id: &str) -> Result<Post> {
        let req = self
            .client
            .get(self.url(&format!("/api/social/posts/{}", post_id)))
            .bearer_auth(token);
        send_json(req).await
    }
}

/// Post mutations. Every call resolves to the full updated post.
#[async_trait]
pub trait SocialApi: Send + Sync {
    async fn fetch_post(&self, token: &str, post_id: &str) -> Result<Post>;

    async fn add_reaction(&self, token: &str, post_id: &str, kind: &str) -> Result<Post>;

    async fn remove_reaction(&self, token: &str, post_id: &str) -> Result<Post>;

    async fn add_comment(&self, token: &str, post_id: &str, content: &str) -> Result<Post>;

    async fn reply_comment(
        &self,
        token: &str,
        post_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<Post>;

    async fn add_comment_reaction(
        &self,
        token: &str,
        post_id: &str,
        comment_id: &str,
        kind: &str,
    ) -> Result<Post>;
}

#[async_trait]
impl SocialApi for ApiClient {
    async fn fetch_post(&self, token: &str, post_id: &str) -> Result<Post> {
        self.get_post(token, post_id).await
    }

    async fn add_reaction(&self, token: &str, post_id: &str, kind: &str) -> Result<Post> {
        let req = self
            .client
            .post(self.url(&format!("/api/social/posts/{}/reactions", post_id)))
            .bearer_auth(token)
            .json(&ReactionRequest {
                kind: kind.to_string(),
            });
        send_json(req).await
    }

    async fn remove_reaction(&self, token: &str, post_id: &str) -> Result<Post> {
        let req = self
            .client
            .delete(self.url(&format!("/api/social/posts/{}/reactions", post_id)))
            .bearer_auth(token);
        send_json(req).await
    }

    async fn add_comment(&self, token: &str, post_id: &str, content: &str) -> Result<Post> {
        let req = self
            .client
            .post(self.url(&format!("/api/social/posts/{}/comments", post_id)))
            .bearer_auth(token)
            .json(&CommentRequest {
                content: content.to_string(),
            });
        send_json(req).await
    }

    async fn reply_comment(
        &self,
        token: &str,
        post_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<Post> {
        let req = self
            .client
            .post(self.url(&format!(
                "/api/social/posts/{}/comments/{}/replies",
                post_id, comment_id
            )))
            .bearer_auth(token)
            .json(&CommentRequest {
                content: content.to_string(),
            });
        send_json(req).await
    }

    async fn add_comment_reaction(
        &self,
        token: &str,
        post_id: &str,
        comment_id: &str,
        kind: &str,
    ) -> Result<Post> {
        let req = self
            .client
            .post(self.url(&format!(
                "/api/social/posts/{}/comments/{}/reactions",
                post_id, comment_id
            )))
            .bearer_auth(token)
            .json(&ReactionRequest {
                kind: kind.to_string(),
            });
        send_json(req).await
    }
}

async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
    let resp = req.send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::from_response(status, &body));
    }

    Ok(resp.json::<T>().await?)
}
