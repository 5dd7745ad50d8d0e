use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Connection,
    Message,
    Match,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Connection => "connection",
            NotificationType::Message => "message",
            NotificationType::Match => "match",
            NotificationType::System => "system",
        }
    }
}

/// Ephemeral per-user notification, kept in redis only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    /// unix epoch millis
    pub timestamp: i64,
    pub read: bool,
    pub link: Option<String>,
}

impl Notification {
    pub fn new(
        notification_type: NotificationType,
        title: &str,
        message: &str,
        link: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            notification_type,
            title: title.to_string(),
            message: message.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            read: false,
            link: link.map(str::to_string),
        }
    }
}
