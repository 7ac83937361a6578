use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Build an `Http` error from a non-2xx response body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        ApiError::Http {
            status: status.as_u16(),
            message,
        }
    }

    /// Text shown in a blocking alert.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ApiError::Http { status: 401, .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ApiError::Http { status: 403, .. } => {
                "You do not have permission to do that.".to_string()
            }
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Parse(_) => "The server sent an unexpected response.".to_string(),
            ApiError::Invalid(reason) => reason.clone(),
            ApiError::NotLoggedIn => "Please sign in to continue.".to_string(),
            ApiError::Storage(_) => "Could not read local data.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

/// Pull a human-readable message out of an error body: `message`, then
/// `error`, then the raw text.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(v) => v
            .get("message")
            .or_else(|| v.get("error"))
            .and_then(|m| m.as_str())
            .map(|s| s.to_string())
            .or_else(|| Some(trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}
