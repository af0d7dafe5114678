//! Document shapes for the user store

use serde::{Deserialize, Serialize};

/// A user document at `users/{userId}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDoc {
    /// Push delivery address; absent until the user's app registers one
    #[serde(rename = "fcmToken", default)]
    pub fcm_token: Option<String>,
}

/// An entry appended to `users/{userId}/notifications`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEntry {
    pub title: String,
    pub message: String,
    /// RFC 3339 creation timestamp
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
}

impl NotificationEntry {
    /// New unread entry stamped with the current time
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            is_read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_doc_token_optional() {
        let user: UserDoc = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(user.fcm_token.is_none());

        let user: UserDoc =
            serde_json::from_value(serde_json::json!({ "fcmToken": "tok-123" })).unwrap();
        assert_eq!(user.fcm_token.as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_notification_entry_wire_names() {
        let entry = NotificationEntry::new("High pH Alert", "pH is 9.1");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["title"], "High pH Alert");
        assert_eq!(json["message"], "pH is 9.1");
        assert_eq!(json["isRead"], false);
        assert!(json["createdAt"].is_string());
    }
}
