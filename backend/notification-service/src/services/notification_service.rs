//! Notification store and aggregation core
//!
//! Owns the `notifications` and `notification_preferences` tables. All
//! notification writes pass through the preference gate here; the comment
//! aggregation state machine (absent → single → aggregated) also lives here
//! because its transitions are row updates.

use crate::error::{AppError, Result};
use crate::models::{
    CreateNotification, Notification, NotificationKind, NotificationPreference, PreferencesUpdate,
};
use chrono::{Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

/// Title for an aggregated comment notification
pub fn aggregated_title(count: i32) -> String {
    format!("{} novos comentários", count)
}

/// Body for an aggregated comment notification
pub fn aggregated_body(count: i32) -> String {
    format!("{} pessoas comentaram no seu post", count)
}

/// First `max` characters of a comment, on a char boundary
pub fn excerpt(content: &str, max: usize) -> String {
    content.chars().take(max).collect()
}

pub struct NotificationService {
    db: PgPool,
    aggregation_window: Duration,
}

impl NotificationService {
    pub fn new(db: PgPool, aggregation_minutes: i64) -> Self {
        Self {
            db,
            aggregation_window: Duration::minutes(aggregation_minutes),
        }
    }

    /// Fetch preferences, falling back to the all-enabled defaults
    pub async fn get_preferences(&self, user_id: &str) -> Result<NotificationPreference> {
        let row = sqlx::query(
            r#"
            SELECT user_id, likes_enabled, comments_enabled, follows_enabled,
                   push_enabled, fcm_token, apns_token, updated_at
            FROM notification_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(match row {
            Some(row) => map_preference(&row),
            None => NotificationPreference::defaults_for(user_id),
        })
    }

    /// Upsert only the provided preference flags
    pub async fn update_preferences(
        &self,
        user_id: &str,
        update: &PreferencesUpdate,
    ) -> Result<NotificationPreference> {
        let current = self.get_preferences(user_id).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO notification_preferences
                (user_id, likes_enabled, comments_enabled, follows_enabled, push_enabled, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET likes_enabled = $2, comments_enabled = $3, follows_enabled = $4,
                push_enabled = $5, updated_at = NOW()
            RETURNING user_id, likes_enabled, comments_enabled, follows_enabled,
                      push_enabled, fcm_token, apns_token, updated_at
            "#,
        )
        .bind(user_id)
        .bind(update.likes_enabled.unwrap_or(current.likes_enabled))
        .bind(update.comments_enabled.unwrap_or(current.comments_enabled))
        .bind(update.follows_enabled.unwrap_or(current.follows_enabled))
        .bind(update.push_enabled.unwrap_or(current.push_enabled))
        .fetch_one(&self.db)
        .await?;

        Ok(map_preference(&row))
    }

    /// Store a vendor push token on the preference row
    pub async fn register_push_token(
        &self,
        user_id: &str,
        token: &str,
        platform: &str,
    ) -> Result<()> {
        let query = match platform {
            "android" => {
                r#"
                INSERT INTO notification_preferences (user_id, fcm_token, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (user_id) DO UPDATE SET fcm_token = $2, updated_at = NOW()
                "#
            }
            "ios" => {
                r#"
                INSERT INTO notification_preferences (user_id, apns_token, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (user_id) DO UPDATE SET apns_token = $2, updated_at = NOW()
                "#
            }
            other => {
                return Err(AppError::BadRequest(format!(
                    "platform must be android or ios, got {}",
                    other
                )))
            }
        };

        sqlx::query(query)
            .bind(user_id)
            .bind(token)
            .execute(&self.db)
            .await?;

        info!(user_id, platform, "Registered push token");
        Ok(())
    }

    /// Create a notification, honoring the recipient's preferences
    ///
    /// Returns None when the recipient disabled this kind.
    pub async fn create(&self, req: CreateNotification) -> Result<Option<Notification>> {
        let prefs = self.get_preferences(&req.user_id).await?;
        if !prefs.allows(req.kind) {
            debug!(
                user_id = %req.user_id,
                kind = req.kind.as_str(),
                "Skipping notification, preference disabled"
            );
            return Ok(None);
        }

        let id = Uuid::new_v4();
        let row = sqlx::query(
            r#"
            INSERT INTO notifications
                (id, user_id, kind, title, body, actor_id, target_id, metadata,
                 is_read, aggregated_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, 1, NOW())
            RETURNING id, user_id, kind, title, body, actor_id, target_id, metadata,
                      is_read, read_at, aggregated_count, created_at
            "#,
        )
        .bind(id)
        .bind(&req.user_id)
        .bind(req.kind.as_str())
        .bind(&req.title)
        .bind(&req.body)
        .bind(&req.actor_id)
        .bind(&req.target_id)
        .bind(&req.metadata)
        .fetch_one(&self.db)
        .await?;

        info!(notification_id = %id, user_id = %req.user_id, "Created notification");
        Ok(Some(map_notification(&row)?))
    }

    /// Newest comment notification for (recipient, post) inside the window
    ///
    /// Candidates are rows with kind comment or comment_aggregated; the most
    /// recently created one wins when several exist.
    pub async fn find_recent_comment(
        &self,
        user_id: &str,
        target_id: &str,
    ) -> Result<Option<Notification>> {
        let window_start = Utc::now() - self.aggregation_window;

        let row = sqlx::query(
            r#"
            SELECT id, user_id, kind, title, body, actor_id, target_id, metadata,
                   is_read, read_at, aggregated_count, created_at
            FROM notifications
            WHERE user_id = $1
              AND target_id = $2
              AND kind IN ('comment', 'comment_aggregated')
              AND created_at >= $3
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(target_id)
        .bind(window_start)
        .fetch_optional(&self.db)
        .await?;

        row.map(|r| map_notification(&r)).transpose()
    }

    /// Fold one more comment into an existing notification
    ///
    /// Promotes kind to comment_aggregated, bumps the count and re-templates
    /// title and body. Returns the new count.
    pub async fn aggregate_comment(&self, notification_id: Uuid) -> Result<i32> {
        let row = sqlx::query(
            r#"
            UPDATE notifications
            SET kind = 'comment_aggregated',
                aggregated_count = aggregated_count + 1
            WHERE id = $1
            RETURNING aggregated_count
            "#,
        )
        .bind(notification_id)
        .fetch_one(&self.db)
        .await?;

        let count: i32 = row.get("aggregated_count");

        sqlx::query(
            r#"
            UPDATE notifications
            SET title = $2, body = $3
            WHERE id = $1
            "#,
        )
        .bind(notification_id)
        .bind(aggregated_title(count))
        .bind(aggregated_body(count))
        .execute(&self.db)
        .await?;

        debug!(%notification_id, count, "Aggregated comment notification");
        Ok(count)
    }

    /// List notifications for a user, newest first
    pub async fn list(
        &self,
        user_id: &str,
        page: i64,
        limit: i64,
        unread_only: bool,
    ) -> Result<(Vec<Notification>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE)
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, kind, title, body, actor_id, target_id, metadata,
                   is_read, read_at, aggregated_count, created_at
            FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE)
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind((page - 1) * limit)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        let notifications = rows
            .iter()
            .map(map_notification)
            .collect::<Result<Vec<_>>>()?;

        Ok((notifications, total))
    }

    /// Fetch a single notification owned by the user
    pub async fn get(&self, user_id: &str, notification_id: Uuid) -> Result<Option<Notification>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, kind, title, body, actor_id, target_id, metadata,
                   is_read, read_at, aggregated_count, created_at
            FROM notifications
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(|r| map_notification(&r)).transpose()
    }

    /// Mark a notification as read; false if it does not exist
    pub async fn mark_read(&self, user_id: &str, notification_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE, read_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a notification; false if it does not exist
    pub async fn delete(&self, user_id: &str, notification_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove notifications past the retention cutoff; returns rows deleted
    pub async fn delete_older_than(&self, retention_days: i64) -> Result<u64> {
        let cutoff = Utc::now() - Duration::days(retention_days);
        let result = sqlx::query("DELETE FROM notifications WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

fn map_notification(row: &PgRow) -> Result<Notification> {
    let kind_str: String = row.get("kind");
    let kind = NotificationKind::parse(&kind_str)
        .ok_or_else(|| AppError::Internal(format!("unknown notification kind: {}", kind_str)))?;

    Ok(Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind,
        title: row.get("title"),
        body: row.get("body"),
        actor_id: row.get("actor_id"),
        target_id: row.get("target_id"),
        metadata: row.get("metadata"),
        is_read: row.get("is_read"),
        read_at: row.get("read_at"),
        aggregated_count: row.get("aggregated_count"),
        created_at: row.get("created_at"),
    })
}

fn map_preference(row: &PgRow) -> NotificationPreference {
    NotificationPreference {
        user_id: row.get("user_id"),
        likes_enabled: row.get("likes_enabled"),
        comments_enabled: row.get("comments_enabled"),
        follows_enabled: row.get("follows_enabled"),
        push_enabled: row.get("push_enabled"),
        fcm_token: row.get("fcm_token"),
        apns_token: row.get("apns_token"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregated_templates_carry_the_count() {
        assert_eq!(aggregated_title(3), "3 novos comentários");
        assert_eq!(aggregated_body(3), "3 pessoas comentaram no seu post");
    }

    #[test]
    fn excerpt_truncates_on_char_boundaries() {
        assert_eq!(excerpt("short", 100), "short");
        let long = "a".repeat(150);
        assert_eq!(excerpt(&long, 100).len(), 100);
        // Multi-byte content must not be split mid-codepoint
        let accented = "çã".repeat(80);
        assert_eq!(excerpt(&accented, 100).chars().count(), 100);
    }
}
