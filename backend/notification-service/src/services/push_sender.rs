//! Push fan-out
//!
//! Decides which vendor gets a notification: FCM when the user registered an
//! Android token and credentials are configured, otherwise APNs for an iOS
//! token, otherwise a mock accept so dev and test environments behave as if
//! delivery succeeded. Vendor failures are logged and swallowed; a failed
//! push never rolls back the stored notification.

use crate::models::NotificationPreference;
use crate::services::{ApnsClient, FcmClient};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct PushSender {
    fcm: Option<Arc<FcmClient>>,
    apns: Option<Arc<ApnsClient>>,
}

impl PushSender {
    pub fn new(fcm: Option<Arc<FcmClient>>, apns: Option<Arc<ApnsClient>>) -> Self {
        Self { fcm, apns }
    }

    /// Attempt push delivery for the given recipient; returns whether a
    /// delivery (or mock delivery) happened
    pub async fn send(
        &self,
        prefs: &NotificationPreference,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> bool {
        if !prefs.push_enabled {
            debug!(user_id = %prefs.user_id, "Push disabled, skipping");
            return false;
        }

        if let (Some(token), Some(fcm)) = (prefs.fcm_token.as_deref(), self.fcm.as_ref()) {
            match fcm.send(token, title, body, Some(data)).await {
                Ok(()) => return true,
                Err(e) => warn!(user_id = %prefs.user_id, "FCM send failed: {}", e),
            }
        }

        if let (Some(token), Some(apns)) = (prefs.apns_token.as_deref(), self.apns.as_ref()) {
            match apns.send(token, title, body, data).await {
                Ok(()) => return true,
                Err(e) => warn!(user_id = %prefs.user_id, "APNs send failed: {}", e),
            }
        }

        if prefs.fcm_token.is_none() && prefs.apns_token.is_none() {
            // No registered device: accept so dev flows observe a delivery
            info!(
                user_id = %prefs.user_id,
                "[mock] push notification: {} - {}", title, body
            );
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prefs(push_enabled: bool) -> NotificationPreference {
        NotificationPreference {
            push_enabled,
            ..NotificationPreference::defaults_for("u1")
        }
    }

    #[tokio::test]
    async fn push_disabled_skips_delivery() {
        let sender = PushSender::new(None, None);
        let delivered = sender
            .send(&prefs(false), "title", "body", &json!({}))
            .await;
        assert!(!delivered);
    }

    #[tokio::test]
    async fn no_tokens_mock_accepts() {
        let sender = PushSender::new(None, None);
        let delivered = sender.send(&prefs(true), "title", "body", &json!({})).await;
        assert!(delivered);
    }

    #[tokio::test]
    async fn token_without_configured_vendor_is_not_mock_accepted() {
        let sender = PushSender::new(None, None);
        let mut p = prefs(true);
        p.fcm_token = Some("device-token".into());
        let delivered = sender.send(&p, "title", "body", &json!({})).await;
        assert!(!delivered);
    }
}
