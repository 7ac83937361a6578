use std::path::PathBuf;
use std::time::Duration;

/// Default API server URL.
/// Override at build time: ASSETDESK_API_URL=https://example.com cargo build
pub const DEFAULT_API_URL: &str = match option_env!("ASSETDESK_API_URL") {
    Some(url) => url,
    None => "https://assetdesk-production.up.railway.app",
};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub page_limit: u32,
    /// Quiet period after the last search/filter change before a reset fetch.
    pub search_debounce: Duration,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            data_dir: PathBuf::from(".assetdesk"),
        }
    }
}

impl Config {
    /// Load from the environment (and a `.env` file when present). Missing or
    /// malformed values keep their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_base_url = lookup("ASSETDESK_API_URL")
            .and_then(|raw| normalize_base_url(&raw))
            .unwrap_or(defaults.api_base_url);

        let page_limit = lookup("ASSETDESK_PAGE_LIMIT")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.page_limit);

        let search_debounce = lookup("ASSETDESK_SEARCH_DEBOUNCE_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.search_debounce);

        let request_timeout = lookup("ASSETDESK_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let data_dir = lookup("ASSETDESK_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        Self {
            api_base_url,
            page_limit,
            search_debounce,
            request_timeout,
            data_dir,
        }
    }
}

/// Validate an http(s) URL and strip trailing slashes.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        log::warn!("Ignoring API URL with unsupported scheme: {}", parsed.scheme());
        return None;
    }
    Some(parsed.as_str().trim_end_matches('/').to_string())
}
