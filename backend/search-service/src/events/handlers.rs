//! Bus event handlers for index synchronization
//!
//! `content.events` drives the posts and hashtags indices, `user.events`
//! drives the users index. Indexing returns a boolean; a false return is
//! retried with exponential backoff up to the policy bound, then the
//! message is dropped and the consumer moves on (at-least-once delivery
//! will bring it back if the producer republishes).

use crate::services::IndexingService;
use event_bus::{Envelope, EventHandler, RetryPolicy};
use std::sync::Arc;
use tracing::{error, warn};

/// Retry an indexing operation per the bounded policy
async fn index_with_retry<F, Fut>(policy: &RetryPolicy, what: &str, op: F)
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let mut attempt = 0;
    loop {
        if op().await {
            return;
        }

        attempt += 1;
        if !policy.should_retry(attempt) {
            error!(what, attempts = attempt, "Giving up on indexing operation");
            return;
        }

        let backoff = policy.backoff(attempt);
        warn!(
            what,
            attempt,
            backoff_secs = backoff.as_secs(),
            "Indexing failed, retrying"
        );
        tokio::time::sleep(backoff).await;
    }
}

/// Extract the document payload: some producers nest it under `data`,
/// others inline the fields on the event itself
fn document_payload(event: &Envelope) -> Envelope {
    match event.data() {
        Some(data) => Envelope::from_value(data.clone()).unwrap_or_else(|_| event.clone()),
        None => event.clone(),
    }
}

pub struct ContentEventHandler {
    topic: String,
    indexing: Arc<IndexingService>,
    retry: RetryPolicy,
}

impl ContentEventHandler {
    pub fn new(topic: String, indexing: Arc<IndexingService>, retry: RetryPolicy) -> Self {
        Self {
            topic,
            indexing,
            retry,
        }
    }
}

#[async_trait::async_trait]
impl EventHandler for ContentEventHandler {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn handle(&self, event: &Envelope) -> anyhow::Result<()> {
        if event.event_type() != Some("post.created") {
            return Ok(());
        }

        let payload = document_payload(event);
        index_with_retry(&self.retry, "post", || self.indexing.index_post(&payload)).await;
        Ok(())
    }
}

pub struct UserEventHandler {
    topic: String,
    indexing: Arc<IndexingService>,
    retry: RetryPolicy,
}

impl UserEventHandler {
    pub fn new(topic: String, indexing: Arc<IndexingService>, retry: RetryPolicy) -> Self {
        Self {
            topic,
            indexing,
            retry,
        }
    }
}

#[async_trait::async_trait]
impl EventHandler for UserEventHandler {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn handle(&self, event: &Envelope) -> anyhow::Result<()> {
        if event.event_type() != Some("user.created") {
            return Ok(());
        }

        let payload = document_payload(event);
        index_with_retry(&self.retry, "user", || self.indexing.index_user(&payload)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            max_backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn retries_until_success() {
        let attempts = AtomicU32::new(0);

        index_with_retry(&fast_policy(), "test", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move { n >= 1 }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let attempts = AtomicU32::new(0);

        index_with_retry(&fast_policy(), "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { false }
        })
        .await;

        // The attempt that exhausts the policy is the third call
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn document_payload_prefers_nested_data() {
        let event = Envelope::from_value(json!({
            "event_type": "user.created",
            "data": { "id": "u1" }
        }))
        .unwrap();
        assert_eq!(document_payload(&event).str_field("id"), Some("u1"));

        let flat = Envelope::from_value(json!({
            "event_type": "post.created",
            "id": "p1"
        }))
        .unwrap();
        assert_eq!(document_payload(&flat).str_field("id"), Some("p1"));
    }
}
