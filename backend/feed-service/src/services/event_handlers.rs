//! Bus event handlers for cache coherence
//!
//! A new post invalidates every follower's cached feed so the next request
//! re-ranks with the new candidate. Interactions only invalidate the post's
//! score cache and the trending list; per-user feeds ride out their TTL.

use crate::services::FeedService;
use event_bus::{Envelope, EventHandler};
use std::sync::Arc;
use tracing::warn;

pub struct ContentEventHandler {
    topic: String,
    service: Arc<FeedService>,
}

impl ContentEventHandler {
    pub fn new(topic: String, service: Arc<FeedService>) -> Self {
        Self { topic, service }
    }

    async fn handle_post_created(&self, event: &Envelope) -> anyhow::Result<()> {
        let Some(author_id) = event.str_field("user_id") else {
            warn!("post.created event missing user_id");
            return Ok(());
        };

        self.service.invalidate_followers_cache(author_id).await?;
        Ok(())
    }

    async fn handle_interaction(&self, event: &Envelope) -> anyhow::Result<()> {
        let Some(post_id) = event.str_field("post_id") else {
            warn!(
                event_type = event.event_type().unwrap_or("unknown"),
                "Interaction event missing post_id"
            );
            return Ok(());
        };

        self.service.invalidate_score(post_id).await?;
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
            Some("post.created") => self.handle_post_created(event).await,
            Some("like.created") | Some("comment.created") | Some("share.created") => {
                self.handle_interaction(event).await
            }
            _ => Ok(()),
        }
    }
}
