use serde::Deserialize;

/// Feed service configuration, loaded from the environment
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub kafka_brokers: String,
    pub kafka_content_topic: String,
    pub kafka_consumer_group: String,

    /// Feed page cache TTL in seconds
    pub feed_cache_ttl_secs: u64,
    /// Relevance score cache TTL in seconds
    pub score_cache_ttl_secs: u64,

    /// Hard cap on page size
    pub posts_per_page: i64,
    /// Candidate rows fetched and cached for a first page
    pub max_feed_size: i64,

    pub engagement_weight_likes: f64,
    pub engagement_weight_comments: f64,
    pub engagement_weight_shares: f64,
    pub time_decay_hours: f64,

    /// Trending considers posts from the last N days
    pub trending_window_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 8005),
            redis_url: env_or("REDIS_URL", "redis://localhost:6379"),
            kafka_brokers: env_or("KAFKA_BROKERS", "localhost:9092"),
            kafka_content_topic: env_or("KAFKA_CONTENT_TOPIC", "content.events"),
            kafka_consumer_group: env_or("KAFKA_CONSUMER_GROUP", "feed-service"),
            feed_cache_ttl_secs: env_parse("FEED_CACHE_TTL_SECS", 300),
            score_cache_ttl_secs: env_parse("SCORE_CACHE_TTL_SECS", 3600),
            posts_per_page: env_parse("POSTS_PER_PAGE", 20),
            max_feed_size: env_parse("MAX_FEED_SIZE", 1000),
            engagement_weight_likes: env_parse("ENGAGEMENT_WEIGHT_LIKES", 1.0),
            engagement_weight_comments: env_parse("ENGAGEMENT_WEIGHT_COMMENTS", 2.0),
            engagement_weight_shares: env_parse("ENGAGEMENT_WEIGHT_SHARES", 3.0),
            time_decay_hours: env_parse("TIME_DECAY_HOURS", 24.0),
            trending_window_days: env_parse("TRENDING_WINDOW_DAYS", 7),
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
