use serde::Deserialize;

/// Notification service configuration, loaded from the environment
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub kafka_brokers: String,
    pub kafka_content_topic: String,
    pub kafka_social_topic: String,
    pub kafka_consumer_group: String,
    pub jwt_secret: String,
    /// Comment aggregation window in minutes
    pub comment_aggregation_minutes: i64,
    /// Notifications older than this are removed by the retention sweep
    pub notification_retention_days: i64,
    /// Interval between retention sweeps in seconds
    pub retention_sweep_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 8001),
            kafka_brokers: env_or("KAFKA_BROKERS", "localhost:9092"),
            kafka_content_topic: env_or("KAFKA_CONTENT_TOPIC", "content.events"),
            kafka_social_topic: env_or("KAFKA_SOCIAL_TOPIC", "social.events"),
            kafka_consumer_group: env_or("KAFKA_CONSUMER_GROUP", "notification-service"),
            jwt_secret: env_or("JWT_SECRET", "change-me-in-production"),
            comment_aggregation_minutes: env_parse("COMMENT_AGGREGATION_MINUTES", 5),
            notification_retention_days: env_parse("NOTIFICATION_RETENTION_DAYS", 90),
            retention_sweep_secs: env_parse("RETENTION_SWEEP_INTERVAL_SECS", 3600),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
