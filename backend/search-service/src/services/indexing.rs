//! Document indexing
//!
//! Translates post and user payloads into index documents with defaults for
//! every optional field, and keeps the hashtags index in sync with the tags
//! extracted from post content. Indexing failures return `false` so the
//! consumer's retry discipline can take over; they never panic the handler.

use crate::es::{
    EsClient, HashtagDocument, HashtagLookup, PostDocument, UserDocument, HASHTAGS_INDEX,
    POSTS_INDEX, USERS_INDEX,
};
use crate::hashtags::extract_hashtags;
use chrono::{DateTime, Utc};
use event_bus::Envelope;
use tracing::{error, info};

pub struct IndexingService {
    es: EsClient,
}

impl IndexingService {
    pub fn new(es: EsClient) -> Self {
        Self { es }
    }

    /// Index a post and upsert its hashtags; documents are searchable at the
    /// next query (immediate refresh)
    pub async fn index_post(&self, data: &Envelope) -> bool {
        let Some(post_id) = data.str_field("id").map(str::to_string) else {
            error!("Post payload missing 'id' field");
            return false;
        };

        let content = data.str_field("content").unwrap_or_default().to_string();
        let hashtags = extract_hashtags(&content);
        let now = Utc::now();

        let doc = PostDocument {
            id: post_id.clone(),
            user_id: data.str_field("user_id").map(str::to_string),
            content,
            hashtags: hashtags.clone(),
            media_urls: data
                .field("media_urls")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default(),
            likes_count: int_field(data, "likes_count"),
            comments_count: int_field(data, "comments_count"),
            shares_count: int_field(data, "shares_count"),
            created_at: date_field(data, "created_at", now),
            updated_at: date_field(data, "updated_at", now),
        };

        if let Err(e) = self.es.index_document(POSTS_INDEX, &post_id, &doc, true).await {
            error!(post_id, "Failed to index post: {}", e);
            return false;
        }
        info!(post_id, tags = hashtags.len(), "Indexed post");

        if !hashtags.is_empty() {
            if let Err(e) = self.index_hashtags(&hashtags).await {
                error!("Failed to index hashtags: {}", e);
                return false;
            }
        }

        true
    }

    /// Index a user profile with immediate refresh
    pub async fn index_user(&self, data: &Envelope) -> bool {
        let Some(user_id) = data.str_field("id").map(str::to_string) else {
            error!("User payload missing 'id' field");
            return false;
        };

        let doc = UserDocument {
            id: user_id.clone(),
            email: data.str_field("email").map(str::to_string),
            name: data.str_field("name").map(str::to_string),
            bio: data.str_field("bio").unwrap_or_default().to_string(),
            profile_picture_url: data
                .str_field("profile_picture_url")
                .unwrap_or_default()
                .to_string(),
            followers_count: int_field(data, "followers_count"),
            following_count: int_field(data, "following_count"),
            created_at: date_field(data, "created_at", Utc::now()),
        };

        if let Err(e) = self.es.index_document(USERS_INDEX, &user_id, &doc, true).await {
            error!(user_id, "Failed to index user: {}", e);
            return false;
        }

        info!(user_id, "Indexed user");
        true
    }

    /// Upsert each tag: bump posts_count and last_used when the document
    /// exists, create it with posts_count 1 otherwise
    async fn index_hashtags(&self, tags: &[String]) -> crate::Result<()> {
        for tag in tags {
            let doc = match self.es.get_hashtag(tag).await? {
                HashtagLookup::Found(existing) => HashtagDocument {
                    tag: tag.clone(),
                    posts_count: existing.posts_count + 1,
                    trending: existing.trending,
                    last_used: Utc::now(),
                },
                HashtagLookup::Absent => HashtagDocument {
                    tag: tag.clone(),
                    posts_count: 1,
                    trending: false,
                    last_used: Utc::now(),
                },
            };

            self.es.index_document(HASHTAGS_INDEX, tag, &doc, true).await?;
        }

        info!(count = tags.len(), "Indexed hashtags");
        Ok(())
    }
}

fn int_field(data: &Envelope, name: &str) -> i64 {
    data.field(name).and_then(|v| v.as_i64()).unwrap_or(0)
}

fn date_field(data: &Envelope, name: &str, default: DateTime<Utc>) -> DateTime<Utc> {
    data.str_field(name)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_field_defaults_to_zero() {
        let env = Envelope::from_value(json!({"likes_count": 7})).unwrap();
        assert_eq!(int_field(&env, "likes_count"), 7);
        assert_eq!(int_field(&env, "comments_count"), 0);
    }

    #[test]
    fn date_field_parses_rfc3339_and_falls_back() {
        let now = Utc::now();
        let env = Envelope::from_value(json!({
            "created_at": "2026-03-01T12:00:00Z",
            "updated_at": "not a date"
        }))
        .unwrap();

        let created = date_field(&env, "created_at", now);
        assert_eq!(created.to_rfc3339(), "2026-03-01T12:00:00+00:00");
        assert_eq!(date_field(&env, "updated_at", now), now);
    }

    #[test]
    fn camel_case_counts_are_accepted() {
        let env = Envelope::from_value(json!({"likesCount": 3})).unwrap();
        assert_eq!(int_field(&env, "likes_count"), 3);
    }
}
