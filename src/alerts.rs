use tokio::sync::broadcast;

use crate::error::ApiError;

/// A blocking, user-facing message for the UI shell to present.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn from_error(title: &str, err: &ApiError) -> Self {
        Self {
            title: title.to_string(),
            message: err.user_message(),
        }
    }
}

#[derive(Clone)]
pub struct AlertHub {
    tx: broadcast::Sender<Alert>,
}

impl AlertHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Publish to every current subscriber. Alerts raised with nobody
    /// listening are dropped.
    pub fn publish(&self, alert: Alert) {
        log::error!("{}: {}", alert.title, alert.message);
        let _ = self.tx.send(alert);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Alert> {
        self.tx.subscribe()
    }
}

impl Default for AlertHub {
    fn default() -> Self {
        Self::new()
    }
}
