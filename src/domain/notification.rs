// Transient user-facing notifications
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Primary,
    Danger,
}

/// A dismissable message. Only one is shown at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Danger,
        }
    }

    pub fn primary(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Primary,
        }
    }
}
