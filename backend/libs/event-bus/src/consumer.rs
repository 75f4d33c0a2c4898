//! Supervised Kafka consumer loop
//!
//! One `EventConsumer` subscribes to the topics its handlers declare under a
//! stable consumer-group id and dispatches each decoded message to the
//! handler registered for that topic. Delivery is at-least-once: offsets are
//! committed after the handler returns, handler errors are logged and the
//! message is considered handled, and undecodable payloads are skipped so a
//! poison message can never block a partition.

use crate::envelope::Envelope;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
    #[error("no handlers registered")]
    NoHandlers,
}

/// Per-topic event handler
///
/// Handlers must be idempotent or tolerate duplicates; the bus may redeliver.
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    /// Topic this handler subscribes to
    fn topic(&self) -> &str;

    /// Process one decoded event
    async fn handle(&self, event: &Envelope) -> anyhow::Result<()>;
}

pub struct EventConsumer {
    consumer: StreamConsumer,
    handlers: HashMap<String, Arc<dyn EventHandler>>,
    group_id: String,
}

impl EventConsumer {
    pub fn new(
        brokers: &str,
        group_id: &str,
        handlers: Vec<Arc<dyn EventHandler>>,
    ) -> Result<Self, ConsumerError> {
        if handlers.is_empty() {
            return Err(ConsumerError::NoHandlers);
        }

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "10000")
            .create()?;

        let topics: Vec<&str> = handlers.iter().map(|h| h.topic()).collect();
        consumer.subscribe(&topics)?;
        info!(group = group_id, ?topics, "Subscribed to event topics");

        let handlers = handlers
            .into_iter()
            .map(|h| (h.topic().to_string(), h))
            .collect();

        Ok(Self {
            consumer,
            handlers,
            group_id: group_id.to_string(),
        })
    }

    /// Run the poll loop until the shutdown signal flips to true
    ///
    /// Transport errors re-enter the loop after a bounded backoff; they never
    /// terminate the consumer.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!(group = %self.group_id, "Consumer shutting down");
                        return;
                    }
                }
                received = self.consumer.recv() => {
                    match received {
                        Ok(message) => {
                            backoff = INITIAL_BACKOFF;
                            self.dispatch(message.topic(), message.payload()).await;
                            if let Err(e) = self.consumer.commit_message(&message, CommitMode::Async) {
                                warn!("Failed to commit offset: {}", e);
                            }
                        }
                        Err(e) => {
                            error!(group = %self.group_id, "Kafka transport error: {}", e);
                            tokio::time::sleep(backoff).await;
                            backoff = (backoff * 2).min(MAX_BACKOFF);
                        }
                    }
                }
            }
        }
    }

    async fn dispatch(&self, topic: &str, payload: Option<&[u8]>) {
        let Some(payload) = payload else {
            debug!(topic, "Skipping message with empty payload");
            return;
        };

        let envelope = match Envelope::from_bytes(payload) {
            Ok(env) => env,
            Err(e) => {
                warn!(topic, "Skipping undecodable message: {}", e);
                return;
            }
        };

        let Some(handler) = self.handlers.get(topic) else {
            debug!(topic, "No handler for topic");
            return;
        };

        if let Err(e) = handler.handle(&envelope).await {
            error!(
                topic,
                event_type = envelope.event_type().unwrap_or("unknown"),
                "Handler error (message considered handled): {:#}",
                e
            );
        }
    }
}
