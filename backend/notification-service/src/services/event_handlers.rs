//! Bus event handlers for notification creation
//!
//! `content.events` carries like.created and comment.created (plus events
//! this service ignores); `social.events` carries follow.created. Comments
//! on the same post inside the aggregation window collapse into one rolling
//! notification instead of creating a new row per comment.

use crate::models::{CreateNotification, NotificationKind};
use crate::services::notification_service::{aggregated_body, aggregated_title, excerpt};
use crate::services::{NotificationService, PushSender};
use event_bus::{Envelope, EventHandler};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

const COMMENT_EXCERPT_LEN: usize = 100;

pub struct ContentEventHandler {
    topic: String,
    service: Arc<NotificationService>,
    push: Arc<PushSender>,
}

impl ContentEventHandler {
    pub fn new(topic: String, service: Arc<NotificationService>, push: Arc<PushSender>) -> Self {
        Self {
            topic,
            service,
            push,
        }
    }

    async fn handle_like(&self, event: &Envelope) -> anyhow::Result<()> {
        let Some((recipient, actor)) = recipient_and_actor(event) else {
            return Ok(());
        };
        let post_id = event.str_field("post_id").map(str::to_string);

        let created = self
            .service
            .create(CreateNotification {
                user_id: recipient.clone(),
                kind: NotificationKind::Like,
                title: "Nova curtida".to_string(),
                body: "Alguém curtiu seu post".to_string(),
                actor_id: actor,
                target_id: post_id.clone(),
                metadata: json!({ "post_id": post_id.clone() }),
            })
            .await?;

        if let Some(notification) = created {
            let prefs = self.service.get_preferences(&recipient).await?;
            self.push
                .send(
                    &prefs,
                    &notification.title,
                    &notification.body,
                    &json!({ "post_id": post_id }),
                )
                .await;
        }

        Ok(())
    }

    async fn handle_comment(&self, event: &Envelope) -> anyhow::Result<()> {
        let Some((recipient, actor)) = recipient_and_actor(event) else {
            return Ok(());
        };
        let Some(post_id) = event.str_field("post_id").map(str::to_string) else {
            warn!("comment.created missing post_id");
            return Ok(());
        };

        // One rolling notification per (recipient, post) inside the window
        if let Some(existing) = self.service.find_recent_comment(&recipient, &post_id).await? {
            let count = self.service.aggregate_comment(existing.id).await?;
            let prefs = self.service.get_preferences(&recipient).await?;
            self.push
                .send(
                    &prefs,
                    &aggregated_title(count),
                    &aggregated_body(count),
                    &json!({ "post_id": post_id }),
                )
                .await;
            return Ok(());
        }

        let content = event.str_field("content").unwrap_or_default();
        let body = if content.is_empty() {
            "Alguém comentou no seu post".to_string()
        } else {
            excerpt(content, COMMENT_EXCERPT_LEN)
        };
        let comment_id = event.str_field("comment_id").map(str::to_string);

        let created = self
            .service
            .create(CreateNotification {
                user_id: recipient.clone(),
                kind: NotificationKind::Comment,
                title: "Novo comentário".to_string(),
                body,
                actor_id: actor,
                target_id: Some(post_id.clone()),
                metadata: json!({ "post_id": post_id.clone(), "comment_id": comment_id }),
            })
            .await?;

        if let Some(notification) = created {
            let prefs = self.service.get_preferences(&recipient).await?;
            self.push
                .send(
                    &prefs,
                    &notification.title,
                    &notification.body,
                    &json!({ "post_id": post_id }),
                )
                .await;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl EventHandler for ContentEventHandler {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn handle(&self, event: &Envelope) -> anyhow::Result<()> {
        match event.event_type() {
            Some("like.created") => self.handle_like(event).await,
            Some("comment.created") => self.handle_comment(event).await,
            _ => Ok(()),
        }
    }
}

pub struct SocialEventHandler {
    topic: String,
    service: Arc<NotificationService>,
    push: Arc<PushSender>,
}

impl SocialEventHandler {
    pub fn new(topic: String, service: Arc<NotificationService>, push: Arc<PushSender>) -> Self {
        Self {
            topic,
            service,
            push,
        }
    }
}

#[async_trait::async_trait]
impl EventHandler for SocialEventHandler {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn handle(&self, event: &Envelope) -> anyhow::Result<()> {
        if event.event_type() != Some("follow.created") {
            return Ok(());
        }

        let following_id = event.str_field("following_id").map(str::to_string);
        let follower_id = event.str_field("follower_id").map(str::to_string);
        let (Some(recipient), Some(actor)) = (following_id, follower_id) else {
            warn!("follow.created missing follower_id or following_id");
            return Ok(());
        };

        let created = self
            .service
            .create(CreateNotification {
                user_id: recipient.clone(),
                kind: NotificationKind::Follow,
                title: "Novo seguidor".to_string(),
                body: "Alguém começou a seguir você".to_string(),
                actor_id: actor.clone(),
                target_id: None,
                metadata: json!({ "follower_id": actor }),
            })
            .await?;

        if let Some(notification) = created {
            let prefs = self.service.get_preferences(&recipient).await?;
            self.push
                .send(
                    &prefs,
                    &notification.title,
                    &notification.body,
                    &json!({ "follower_id": notification.actor_id }),
                )
                .await;
        }

        Ok(())
    }
}

/// The (recipient, actor) pair common to like and comment events
fn recipient_and_actor(event: &Envelope) -> Option<(String, String)> {
    let recipient = event.str_field("post_author_id");
    let actor = event.str_field("user_id");
    match (recipient, actor) {
        (Some(r), Some(a)) => Some((r.to_string(), a.to_string())),
        _ => {
            warn!(
                event_type = event.event_type().unwrap_or("unknown"),
                "Event missing post_author_id or user_id"
            );
            None
        }
    }
}
