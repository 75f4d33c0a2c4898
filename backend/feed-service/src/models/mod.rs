use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized post metrics read from the relational store
#[derive(Debug, Clone)]
pub struct PostMetadata {
    pub post_id: String,
    pub user_id: String,
    pub likes_count: Option<i32>,
    pub comments_count: Option<i32>,
    pub shares_count: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// A scored feed entry
///
/// `content` is intentionally empty: post bodies live in the content
/// service's document store and are joined by the client or gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub likes_count: i32,
    pub comments_count: i32,
    pub shares_count: i32,
    pub created_at: DateTime<Utc>,
    pub relevance_score: f64,
}

/// Feed page with cursor pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<Post>,
    pub cursor: Option<String>,
    pub has_more: bool,
}

impl FeedResponse {
    pub fn empty() -> Self {
        Self {
            posts: Vec::new(),
            cursor: None,
            has_more: false,
        }
    }
}

/// Request body for POST /score
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub user_id: String,
    pub post_id: String,
}

/// Response for POST /score
#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub post_id: String,
    pub relevance_score: f64,
}
