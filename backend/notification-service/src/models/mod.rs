use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification kind enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone liked a post
    Like,
    /// Single comment on a post
    Comment,
    /// Rolling notification for a burst of comments on the same post
    CommentAggregated,
    /// New follower
    Follow,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::CommentAggregated => "comment_aggregated",
            NotificationKind::Follow => "follow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(NotificationKind::Like),
            "comment" => Some(NotificationKind::Comment),
            "comment_aggregated" => Some(NotificationKind::CommentAggregated),
            "follow" => Some(NotificationKind::Follow),
            _ => None,
        }
    }
}

/// Stored notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,

    /// Recipient user ID
    pub user_id: String,

    pub kind: NotificationKind,

    pub title: String,
    pub body: String,

    /// Who triggered the notification
    pub actor_id: String,

    /// Target object (post id for likes and comments)
    pub target_id: Option<String>,

    pub metadata: serde_json::Value,

    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,

    /// Number of collapsed events; 1 unless the kind is comment_aggregated
    pub aggregated_count: i32,

    pub created_at: DateTime<Utc>,
}

/// Request to create a notification
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub actor_id: String,
    pub target_id: Option<String>,
    pub metadata: serde_json::Value,
}

/// Per-user notification preferences
///
/// A user with no stored row gets the defaults (everything enabled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub user_id: String,
    pub likes_enabled: bool,
    pub comments_enabled: bool,
    pub follows_enabled: bool,
    pub push_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns_token: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl NotificationPreference {
    pub fn defaults_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            likes_enabled: true,
            comments_enabled: true,
            follows_enabled: true,
            push_enabled: true,
            fcm_token: None,
            apns_token: None,
            updated_at: None,
        }
    }

    /// Whether notifications of the given kind are enabled
    pub fn allows(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Like => self.likes_enabled,
            NotificationKind::Comment | NotificationKind::CommentAggregated => {
                self.comments_enabled
            }
            NotificationKind::Follow => self.follows_enabled,
        }
    }
}

/// Partial preference update (PUT /preferences)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub likes_enabled: Option<bool>,
    pub comments_enabled: Option<bool>,
    pub follows_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
}

/// Push token registration (POST /preferences/push-token)
#[derive(Debug, Clone, Deserialize)]
pub struct PushTokenRequest {
    pub token: String,
    /// "android" or "ios"
    pub platform: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in [
            NotificationKind::Like,
            NotificationKind::Comment,
            NotificationKind::CommentAggregated,
            NotificationKind::Follow,
        ] {
            assert_eq!(NotificationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::parse("mention"), None);
    }

    #[test]
    fn preference_gate_maps_kind_to_flag() {
        let mut prefs = NotificationPreference::defaults_for("u1");
        assert!(prefs.allows(NotificationKind::Like));

        prefs.likes_enabled = false;
        assert!(!prefs.allows(NotificationKind::Like));
        assert!(prefs.allows(NotificationKind::Comment));

        prefs.comments_enabled = false;
        assert!(!prefs.allows(NotificationKind::Comment));
        assert!(!prefs.allows(NotificationKind::CommentAggregated));
        assert!(prefs.allows(NotificationKind::Follow));
    }
}
