use serde::Deserialize;

/// Data block of a push notification.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub ticket_id: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
}

/// Screen to open when the user taps a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Ticket(String),
    Chat(String),
    Feed,
    Devices,
}

pub fn parse_payload(raw: &str) -> Option<NotificationPayload> {
    match serde_json::from_str(raw) {
        Ok(payload) => Some(payload),
        Err(e) => {
            log::warn!("Unreadable notification payload: {}", e);
            None
        }
    }
}

/// `None` when the payload names a screen but lacks the id it needs.
pub fn route_for(payload: &NotificationPayload) -> Option<Route> {
    let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

    match payload.kind.as_str() {
        "ticket" | "ticket_update" | "ticket_assigned" | "ticket_comment" => {
            non_empty(&payload.ticket_id).map(Route::Ticket)
        }
        "chat" | "chat_message" | "message" => non_empty(&payload.chat_id).map(Route::Chat),
        "post" | "reaction" | "comment" | "social" => Some(Route::Feed),
        "device" | "device_assigned" | "device_revoked" => Some(Route::Devices),
        other => {
            log::debug!("No route for notification type {:?}", other);
            None
        }
    }
}
