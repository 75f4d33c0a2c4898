//! Relational reads for feed assembly
//!
//! The feed service owns no write path to these tables; they are projections
//! maintained by the social and content services.

use crate::error::Result;
use crate::models::PostMetadata;
use chrono::{Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const POST_COLUMNS: &str = "post_id, user_id, likes_count, comments_count, shares_count, created_at";

#[derive(Clone)]
pub struct FeedRepo {
    db: PgPool,
}

impl FeedRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Users the given user follows
    pub async fn followings(&self, user_id: &str) -> Result<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT following_id FROM followers WHERE follower_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// Followers of the given user
    pub async fn followers(&self, user_id: &str) -> Result<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT follower_id FROM followers WHERE following_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// Most recent posts from the followed authors (first feed page)
    pub async fn recent_posts_by_authors(
        &self,
        author_ids: &[String],
        limit: i64,
    ) -> Result<Vec<PostMetadata>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM post_metadata
            WHERE user_id = ANY($1)
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(author_ids)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.iter().map(map_post_metadata).collect())
    }

    /// Pages after the first use the last returned post id as the cursor.
    /// Known caveat: post ids are opaque, so `post_id > cursor` does not
    /// track the (score, created_at) output order exactly.
    pub async fn posts_by_authors_after(
        &self,
        author_ids: &[String],
        cursor: &str,
        limit: i64,
    ) -> Result<Vec<PostMetadata>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM post_metadata
            WHERE user_id = ANY($1)
              AND post_id > $2
            ORDER BY created_at DESC
            LIMIT $3
            "#
        ))
        .bind(author_ids)
        .bind(cursor)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.iter().map(map_post_metadata).collect())
    }

    /// Globally popular posts from the trending window, pre-ranked by raw
    /// engagement so the scorer only re-sorts a small candidate set
    pub async fn trending_posts(&self, window_days: i64, limit: i64) -> Result<Vec<PostMetadata>> {
        let window_start = Utc::now() - Duration::days(window_days);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM post_metadata
            WHERE created_at >= $1
            ORDER BY
                (COALESCE(likes_count, 0)
                 + COALESCE(comments_count, 0) * 2
                 + COALESCE(shares_count, 0) * 3) DESC,
                created_at DESC
            LIMIT $2
            "#
        ))
        .bind(window_start)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.iter().map(map_post_metadata).collect())
    }

    /// Metadata for one post
    pub async fn post_metadata(&self, post_id: &str) -> Result<Option<PostMetadata>> {
        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM post_metadata WHERE post_id = $1"
        ))
        .bind(post_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.as_ref().map(map_post_metadata))
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

fn map_post_metadata(row: &PgRow) -> PostMetadata {
    PostMetadata {
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        likes_count: row.get("likes_count"),
        comments_count: row.get("comments_count"),
        shares_count: row.get("shares_count"),
        created_at: row.get("created_at"),
    }
}
