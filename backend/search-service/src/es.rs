//! Elasticsearch client wrapper
//!
//! Owns the transport, the three index definitions and the low-level
//! index/get/search calls. Index bootstrap runs at startup so the consumers
//! and the query surface can assume the indices exist.

use chrono::{DateTime, Utc};
use elasticsearch::{
    http::transport::{BuildError, SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
    Elasticsearch, GetParts, IndexParts, SearchParts,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;
use url::Url;

pub const POSTS_INDEX: &str = "posts";
pub const USERS_INDEX: &str = "users";
pub const HASHTAGS_INDEX: &str = "hashtags";

#[derive(Debug, Error)]
pub enum EsError {
    #[error("invalid Elasticsearch URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build transport: {0}")]
    TransportBuild(#[from] BuildError),
    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("index returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Post document stored in the `posts` index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDocument {
    pub id: String,
    pub user_id: Option<String>,
    pub content: String,
    pub hashtags: Vec<String>,
    pub media_urls: Vec<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub shares_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User document stored in the `users` index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub bio: String,
    pub profile_picture_url: String,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Hashtag document stored in the `hashtags` index, keyed by the tag itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashtagDocument {
    pub tag: String,
    pub posts_count: i64,
    pub trending: bool,
    pub last_used: DateTime<Utc>,
}

/// Outcome of a hashtag presence check
#[derive(Debug, Clone)]
pub enum HashtagLookup {
    Found(HashtagDocument),
    Absent,
}

#[derive(Clone)]
pub struct EsClient {
    client: Elasticsearch,
}

impl EsClient {
    pub fn new(url: &str) -> Result<Self, EsError> {
        let parsed = Url::parse(url)?;
        let pool = SingleNodeConnectionPool::new(parsed);
        let transport = TransportBuilder::new(pool).build()?;
        Ok(Self {
            client: Elasticsearch::new(transport),
        })
    }

    pub async fn ping(&self) -> Result<(), EsError> {
        let response = self.client.ping().send().await?;
        let status = response.status_code();
        if status.is_success() {
            Ok(())
        } else {
            Err(EsError::Status {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }

    /// Create the posts, users and hashtags indices when absent
    pub async fn ensure_indices(&self) -> Result<(), EsError> {
        self.ensure_index(POSTS_INDEX, posts_mapping()).await?;
        self.ensure_index(USERS_INDEX, users_mapping()).await?;
        self.ensure_index(HASHTAGS_INDEX, hashtags_mapping()).await?;
        Ok(())
    }

    async fn ensure_index(&self, name: &str, mapping: Value) -> Result<(), EsError> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[name]))
            .send()
            .await?;

        if exists.status_code().is_success() {
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(name))
            .body(mapping)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(index = name, "Created index");
        Ok(())
    }

    /// Index one document, optionally with immediate refresh so it is
    /// visible to the next query
    pub async fn index_document<T: Serialize>(
        &self,
        index: &str,
        id: &str,
        doc: &T,
        refresh: bool,
    ) -> Result<(), EsError> {
        let request = self.client.index(IndexParts::IndexId(index, id)).body(doc);
        let request = if refresh {
            request.refresh(Refresh::True)
        } else {
            request
        };

        let response = request.send().await?;
        let status = response.status_code();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(EsError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Presence check for a hashtag document
    pub async fn get_hashtag(&self, tag: &str) -> Result<HashtagLookup, EsError> {
        let response = self
            .client
            .get(GetParts::IndexId(HASHTAGS_INDEX, tag))
            .send()
            .await?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(HashtagLookup::Absent);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await?;
        if value["found"].as_bool() != Some(true) {
            return Ok(HashtagLookup::Absent);
        }

        let doc: HashtagDocument = serde_json::from_value(value["_source"].clone())?;
        Ok(HashtagLookup::Found(doc))
    }

    /// Execute a search body against one index; returns the hit sources and
    /// the total hit count
    pub async fn search(&self, index: &str, body: Value) -> Result<(Vec<Value>, i64), EsError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await?;
        let total = value["hits"]["total"]["value"].as_i64().unwrap_or(0);
        let hits = value["hits"]["hits"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| {
                        let source = &hit["_source"];
                        (!source.is_null()).then(|| source.clone())
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok((hits, total))
    }
}

fn posts_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "user_id": { "type": "keyword" },
                "content": {
                    "type": "text",
                    "analyzer": "standard",
                    "fields": { "keyword": { "type": "keyword" } }
                },
                "hashtags": { "type": "keyword" },
                "media_urls": { "type": "object", "enabled": false },
                "likes_count": { "type": "integer" },
                "comments_count": { "type": "integer" },
                "shares_count": { "type": "integer" },
                "created_at": { "type": "date" },
                "updated_at": { "type": "date" }
            }
        },
        "settings": { "number_of_shards": 1, "number_of_replicas": 0 }
    })
}

fn users_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "email": { "type": "keyword" },
                "name": {
                    "type": "text",
                    "analyzer": "standard",
                    "fields": { "keyword": { "type": "keyword" } }
                },
                "bio": { "type": "text", "analyzer": "standard" },
                "profile_picture_url": { "type": "keyword" },
                "followers_count": { "type": "integer" },
                "following_count": { "type": "integer" },
                "created_at": { "type": "date" }
            }
        },
        "settings": { "number_of_shards": 1, "number_of_replicas": 0 }
    })
}

fn hashtags_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "tag": { "type": "keyword" },
                "posts_count": { "type": "integer" },
                "trending": { "type": "boolean" },
                "last_used": { "type": "date" }
            }
        },
        "settings": { "number_of_shards": 1, "number_of_replicas": 0 }
    })
}
