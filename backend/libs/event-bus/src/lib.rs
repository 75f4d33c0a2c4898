//! Shared event-bus plumbing for the Orbe services
//!
//! Every service consumes the same Kafka topology (`content.events`,
//! `social.events`, `user.events`) with at-least-once delivery. This library
//! owns the two pieces they all need: the JSON envelope with dual-spelling
//! field access (producers disagree on camelCase vs snake_case) and the
//! supervised consumer loop that dispatches each message to a per-topic
//! handler.

pub mod consumer;
pub mod envelope;
pub mod retry;

pub use consumer::{EventConsumer, EventHandler};
pub use envelope::Envelope;
pub use retry::RetryPolicy;
