//! JSON event envelope with dual-spelling field access
//!
//! The Java producers publish camelCase field names (`postId`, `followerId`)
//! while the newer producers publish snake_case (`post_id`, `follower_id`).
//! Handlers always ask for the snake_case name; the envelope falls back to
//! the camelCase spelling automatically.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("payload is not valid UTF-8")]
    NotUtf8,
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// A decoded event payload
#[derive(Debug, Clone)]
pub struct Envelope {
    value: Value,
}

impl Envelope {
    /// Decode a raw Kafka payload into an envelope
    pub fn from_bytes(payload: &[u8]) -> Result<Self, EnvelopeError> {
        let text = std::str::from_utf8(payload).map_err(|_| EnvelopeError::NotUtf8)?;
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(EnvelopeError::NotAnObject);
        }
        Ok(Self { value })
    }

    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        if !value.is_object() {
            return Err(EnvelopeError::NotAnObject);
        }
        Ok(Self { value })
    }

    /// The event discriminant, read from `event_type` or `eventType`
    pub fn event_type(&self) -> Option<&str> {
        self.str_field("event_type")
    }

    /// Look up a field by its snake_case name, falling back to camelCase
    pub fn field(&self, snake: &str) -> Option<&Value> {
        let obj = self.value.as_object()?;
        if let Some(v) = obj.get(snake) {
            if !v.is_null() {
                return Some(v);
            }
        }
        let camel = camel_case(snake);
        obj.get(camel.as_str()).filter(|v| !v.is_null())
    }

    /// String field with the same dual-spelling fallback
    pub fn str_field(&self, snake: &str) -> Option<&str> {
        self.field(snake).and_then(Value::as_str)
    }

    /// The nested `data` object carried by some producers (e.g. user.created)
    pub fn data(&self) -> Option<&Value> {
        self.field("data").filter(|v| v.is_object())
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }
}

/// Mechanical snake_case → camelCase conversion (`post_author_id` → `postAuthorId`)
fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_snake_case_fields() {
        let env = Envelope::from_value(json!({
            "event_type": "like.created",
            "post_id": "p1",
            "user_id": "u2"
        }))
        .unwrap();

        assert_eq!(env.event_type(), Some("like.created"));
        assert_eq!(env.str_field("post_id"), Some("p1"));
        assert_eq!(env.str_field("user_id"), Some("u2"));
    }

    #[test]
    fn falls_back_to_camel_case() {
        let env = Envelope::from_value(json!({
            "eventType": "like.created",
            "postId": "p1",
            "postAuthorId": "u1"
        }))
        .unwrap();

        assert_eq!(env.event_type(), Some("like.created"));
        assert_eq!(env.str_field("post_id"), Some("p1"));
        assert_eq!(env.str_field("post_author_id"), Some("u1"));
    }

    #[test]
    fn snake_case_wins_when_both_present() {
        let env = Envelope::from_value(json!({
            "post_id": "snake",
            "postId": "camel"
        }))
        .unwrap();

        assert_eq!(env.str_field("post_id"), Some("snake"));
    }

    #[test]
    fn null_fields_are_absent() {
        let env = Envelope::from_value(json!({
            "post_id": null,
            "postId": "p1"
        }))
        .unwrap();

        assert_eq!(env.str_field("post_id"), Some("p1"));
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert!(Envelope::from_bytes(b"[1,2,3]").is_err());
        assert!(Envelope::from_bytes(b"not json").is_err());
        assert!(Envelope::from_bytes(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn data_returns_nested_object() {
        let env = Envelope::from_value(json!({
            "event_type": "user.created",
            "data": {"id": "u1", "name": "Ana"}
        }))
        .unwrap();

        let data = env.data().unwrap();
        assert_eq!(data["id"], "u1");
    }
}
