use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything the list controller can dedupe.
pub trait Identified {
    fn id(&self) -> &str;
}

// ── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The backend sends users either as a bare id or populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Profile(UserSummary),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::Profile(p) => &p.id,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            UserRef::Id(_) => None,
            UserRef::Profile(p) => p.name.as_deref().or(p.email.as_deref()),
        }
    }
}

// ── Devices ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    Active,
    Standby,
    Broken,
    PendingDocumentation,
    #[serde(other)]
    Unknown,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "Active",
            DeviceStatus::Standby => "Standby",
            DeviceStatus::Broken => "Broken",
            DeviceStatus::PendingDocumentation => "PendingDocumentation",
            DeviceStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub user: UserRef,
    pub start_date: DateTime<Utc>,
    /// Absent on the currently open assignment.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    pub status: DeviceStatus,
    #[serde(default)]
    pub assigned: Vec<UserRef>,
    #[serde(default)]
    pub assignment_history: Vec<AssignmentRecord>,
}

impl Device {
    pub fn current_assignment(&self) -> Option<&AssignmentRecord> {
        self.assignment_history.iter().find(|r| r.end_date.is_none())
    }

    /// At most one history entry may be open.
    pub fn has_consistent_history(&self) -> bool {
        self.assignment_history
            .iter()
            .filter(|r| r.end_date.is_none())
            .count()
            <= 1
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assigned.iter().any(|u| u.id() == user_id)
    }
}

impl Identified for Device {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Device list filters, sent as query parameters alongside the search text.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DeviceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterOptions {
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDeviceRequest {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatusRequest {
    pub status: DeviceStatus,
}

// ── Social ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reaction {
    pub user: UserRef,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(alias = "user")]
    pub author: UserRef,
    pub content: String,
    #[serde(default)]
    pub parent_comment: Option<String>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_comment.is_some()
    }
}

impl Identified for Comment {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A feed post with every comment and reaction: the aggregate the server
/// returns after each social mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: UserRef,
    pub content: String,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentRequest {
    pub content: String,
}

// ── Pagination ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    #[serde(alias = "devices", alias = "posts")]
    pub items: Vec<T>,
    pub pagination: Pagination,
}
