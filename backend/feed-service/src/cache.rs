//! Redis-backed caches for ranked feeds and relevance scores
//!
//! Keys:
//! - `feed:{user_id}` → serialized ranked feed (full candidate list)
//! - `feed:trending` → serialized global trending list
//! - `score:{post_id}` → stringified relevance score
//!
//! Cache contents that fail to parse are treated as misses so a corrupt
//! entry degrades to a recompute, never an error.

use crate::error::Result;
use crate::models::Post;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const TRENDING_KEY: &str = "feed:trending";

pub fn feed_key(user_id: &str) -> String {
    format!("feed:{}", user_id)
}

pub fn score_key(post_id: &str) -> String {
    format!("score:{}", post_id)
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedFeed {
    posts: Vec<Post>,
}

#[derive(Clone)]
pub struct FeedCache {
    client: ConnectionManager,
    feed_ttl_secs: u64,
    score_ttl_secs: u64,
}

impl FeedCache {
    pub async fn connect(
        redis_url: &str,
        feed_ttl_secs: u64,
        score_ttl_secs: u64,
    ) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(crate::error::AppError::Redis)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self {
            client: manager,
            feed_ttl_secs,
            score_ttl_secs,
        })
    }

    /// Ping Redis to check connection health
    pub async fn ping(&self) -> Result<()> {
        redis::cmd("PING")
            .query_async::<_, String>(&mut self.client.clone())
            .await?;
        Ok(())
    }

    /// Cached ranked list under the given feed key, None on miss or corrupt entry
    pub async fn get_feed(&self, key: &str) -> Result<Option<Vec<Post>>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.client.clone())
            .await?;

        Ok(value.and_then(|json| match serde_json::from_str::<CachedFeed>(&json) {
            Ok(cached) => {
                debug!(key, "Feed cache hit");
                Some(cached.posts)
            }
            Err(e) => {
                warn!(key, "Discarding unparseable feed cache entry: {}", e);
                None
            }
        }))
    }

    /// Store a ranked list under the given feed key
    pub async fn set_feed(&self, key: &str, posts: &[Post]) -> Result<()> {
        let json = serde_json::to_string(&CachedFeed {
            posts: posts.to_vec(),
        })
        .map_err(|e| crate::error::AppError::Internal(format!("cache serialization: {}", e)))?;

        redis::cmd("SETEX")
            .arg(key)
            .arg(self.feed_ttl_secs)
            .arg(json)
            .query_async::<_, ()>(&mut self.client.clone())
            .await?;

        debug!(key, ttl = self.feed_ttl_secs, "Cached feed");
        Ok(())
    }

    /// Delete one cache key; returns whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let deleted: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut self.client.clone())
            .await?;
        Ok(deleted > 0)
    }

    /// Cached relevance score, None on miss or non-numeric entry
    pub async fn get_score(&self, post_id: &str) -> Result<Option<f64>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(score_key(post_id))
            .query_async(&mut self.client.clone())
            .await?;

        Ok(value.and_then(|raw| match raw.parse::<f64>() {
            Ok(score) => Some(score),
            Err(_) => {
                warn!(post_id, "Discarding non-numeric score cache entry");
                None
            }
        }))
    }

    /// Store a relevance score
    pub async fn set_score(&self, post_id: &str, score: f64) -> Result<()> {
        redis::cmd("SETEX")
            .arg(score_key(post_id))
            .arg(self.score_ttl_secs)
            .arg(score.to_string())
            .query_async::<_, ()>(&mut self.client.clone())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_keys_follow_the_store_layout() {
        assert_eq!(feed_key("u1"), "feed:u1");
        assert_eq!(score_key("p9"), "score:p9");
        assert_eq!(TRENDING_KEY, "feed:trending");
    }
}
