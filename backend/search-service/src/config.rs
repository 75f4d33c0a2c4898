use serde::Deserialize;

/// Search service configuration, loaded from the environment
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub elasticsearch_url: String,
    pub kafka_brokers: String,
    pub kafka_content_topic: String,
    pub kafka_user_topic: String,
    pub kafka_consumer_group: String,
    /// Hard timeout for index queries in milliseconds
    pub search_timeout_ms: u64,
    /// Bounded retries for failed indexing operations
    pub index_max_retries: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 8004),
            elasticsearch_url: env_or("ELASTICSEARCH_URL", "http://localhost:9200"),
            kafka_brokers: env_or("KAFKA_BROKERS", "localhost:9092"),
            kafka_content_topic: env_or("KAFKA_CONTENT_TOPIC", "content.events"),
            kafka_user_topic: env_or("KAFKA_USER_TOPIC", "user.events"),
            kafka_consumer_group: env_or("KAFKA_CONSUMER_GROUP", "search-service"),
            search_timeout_ms: env_parse("SEARCH_TIMEOUT_MS", 500),
            index_max_retries: env_parse("INDEX_MAX_RETRIES", 3),
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
