//! Ranked feed assembly, score caching and invalidation
//!
//! The canonical feed order is (relevance score desc, created_at desc) over
//! posts by followed authors. First pages are served from and written back
//! to the feed cache; cursor pages bypass the cache and use a keyset
//! predicate on the opaque post id.

use crate::cache::{feed_key, FeedCache, TRENDING_KEY};
use crate::error::Result;
use crate::models::{FeedResponse, Post, PostMetadata};
use crate::repo::FeedRepo;
use crate::services::scoring::RelevanceScorer;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

pub struct FeedService {
    repo: FeedRepo,
    cache: FeedCache,
    scorer: RelevanceScorer,
    posts_per_page: i64,
    max_feed_size: i64,
    trending_window_days: i64,
}

impl FeedService {
    pub fn new(
        repo: FeedRepo,
        cache: FeedCache,
        scorer: RelevanceScorer,
        posts_per_page: i64,
        max_feed_size: i64,
        trending_window_days: i64,
    ) -> Self {
        Self {
            repo,
            cache,
            scorer,
            posts_per_page,
            max_feed_size,
            trending_window_days,
        }
    }

    /// Generate a feed page for a user
    ///
    /// Posts come from followed authors only; an empty following set yields
    /// an empty feed (trending is a separate endpoint).
    pub async fn generate_feed(
        &self,
        user_id: &str,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<FeedResponse> {
        let limit = limit.clamp(1, self.posts_per_page) as usize;

        // First page only: try the cached ranked list
        if cursor.is_none() {
            match self.cache.get_feed(&feed_key(user_id)).await {
                Ok(Some(posts)) => return Ok(paginate(posts, limit)),
                Ok(None) => {}
                Err(e) => warn!(user_id, "Feed cache read failed: {}", e),
            }
        }

        let followings = self.repo.followings(user_id).await?;
        if followings.is_empty() {
            return Ok(FeedResponse::empty());
        }

        let rows = match cursor {
            Some(cursor) => {
                self.repo
                    .posts_by_authors_after(&followings, cursor, limit as i64 + 1)
                    .await?
            }
            None => {
                self.repo
                    .recent_posts_by_authors(&followings, self.max_feed_size)
                    .await?
            }
        };
        if rows.is_empty() {
            return Ok(FeedResponse::empty());
        }

        let mut posts: Vec<Post> = rows.iter().map(|row| self.to_post(row)).collect();
        rank(&mut posts);

        // Cache the full sorted candidate list so later first-page requests
        // slice without touching the database
        if cursor.is_none() {
            let cached = &posts[..posts.len().min(self.max_feed_size as usize)];
            if let Err(e) = self.cache.set_feed(&feed_key(user_id), cached).await {
                warn!(user_id, "Feed cache write failed: {}", e);
            }
        }

        Ok(paginate(posts, limit))
    }

    /// Relevance score for one post, cache-first
    pub async fn calculate_score(&self, post_id: &str) -> Result<f64> {
        match self.cache.get_score(post_id).await {
            Ok(Some(score)) => return Ok(score),
            Ok(None) => {}
            Err(e) => warn!(post_id, "Score cache read failed: {}", e),
        }

        let Some(metadata) = self.repo.post_metadata(post_id).await? else {
            warn!(post_id, "Post not found, scoring as zero");
            return Ok(0.0);
        };

        let score = self.scorer.score(&metadata);
        if let Err(e) = self.cache.set_score(post_id, score).await {
            warn!(post_id, "Score cache write failed: {}", e);
        }

        debug!(post_id, score, "Calculated relevance score");
        Ok(score)
    }

    /// Globally popular posts from the trending window
    pub async fn trending(&self, limit: i64) -> Result<FeedResponse> {
        let limit = limit.clamp(1, 100) as usize;

        match self.cache.get_feed(TRENDING_KEY).await {
            Ok(Some(posts)) => {
                let page: Vec<Post> = posts.into_iter().take(limit).collect();
                return Ok(FeedResponse {
                    posts: page,
                    cursor: None,
                    has_more: false,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Trending cache read failed: {}", e),
        }

        let rows = self
            .repo
            .trending_posts(self.trending_window_days, limit as i64 * 2)
            .await?;
        if rows.is_empty() {
            return Ok(FeedResponse::empty());
        }

        let mut posts: Vec<Post> = rows.iter().map(|row| self.to_post(row)).collect();
        rank(&mut posts);
        posts.truncate(limit);

        if let Err(e) = self.cache.set_feed(TRENDING_KEY, &posts).await {
            warn!("Trending cache write failed: {}", e);
        }

        Ok(FeedResponse {
            posts,
            cursor: None,
            has_more: false,
        })
    }

    /// Drop the cached feed for one user (administrative endpoint)
    pub async fn invalidate_user_cache(&self, user_id: &str) -> Result<()> {
        self.cache.delete(&feed_key(user_id)).await?;
        info!(user_id, "Invalidated feed cache");
        Ok(())
    }

    /// Drop the cached feed of every follower of the author; returns how
    /// many follower keys were invalidated
    pub async fn invalidate_followers_cache(&self, author_id: &str) -> Result<usize> {
        let followers = self.repo.followers(author_id).await?;

        let mut invalidated = 0;
        for follower_id in &followers {
            self.cache.delete(&feed_key(follower_id)).await?;
            invalidated += 1;
        }

        info!(
            author_id,
            invalidated, "Invalidated follower feed caches after new post"
        );
        Ok(invalidated)
    }

    /// An interaction changed a post's engagement: drop its score cache and
    /// the trending list. Per-user feeds are left to expire via TTL.
    pub async fn invalidate_score(&self, post_id: &str) -> Result<()> {
        self.cache.delete(&crate::cache::score_key(post_id)).await?;
        self.cache.delete(TRENDING_KEY).await?;
        info!(post_id, "Invalidated score and trending caches");
        Ok(())
    }

    pub fn repo(&self) -> &FeedRepo {
        &self.repo
    }

    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }

    fn to_post(&self, row: &PostMetadata) -> Post {
        Post {
            id: row.post_id.clone(),
            user_id: row.user_id.clone(),
            content: String::new(),
            likes_count: row.likes_count.unwrap_or(0),
            comments_count: row.comments_count.unwrap_or(0),
            shares_count: row.shares_count.unwrap_or(0),
            created_at: row.created_at,
            relevance_score: self.scorer.score(row),
        }
    }
}

/// Sort into the canonical feed order: score desc, then created_at desc
pub fn rank(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Slice a ranked candidate list into one page with cursor metadata
pub fn paginate(posts: Vec<Post>, limit: usize) -> FeedResponse {
    let has_more = posts.len() > limit;
    let page: Vec<Post> = posts.into_iter().take(limit).collect();
    let cursor = if has_more {
        page.last().map(|p| p.id.clone())
    } else {
        None
    };

    FeedResponse {
        posts: page,
        cursor,
        has_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn post(id: &str, score: f64, age_hours: i64) -> Post {
        Post {
            id: id.into(),
            user_id: "author".into(),
            content: String::new(),
            likes_count: 0,
            comments_count: 0,
            shares_count: 0,
            created_at: Utc::now() - Duration::hours(age_hours),
            relevance_score: score,
        }
    }

    #[test]
    fn rank_orders_by_score_then_recency() {
        let mut posts = vec![post("low", 1.0, 1), post("high", 9.0, 5), post("mid", 4.0, 2)];
        rank(&mut posts);
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["high", "mid", "low"]);
    }

    #[test]
    fn rank_breaks_score_ties_by_recency() {
        let mut posts = vec![post("older", 5.0, 10), post("newer", 5.0, 1)];
        rank(&mut posts);
        assert_eq!(posts[0].id, "newer");
    }

    #[test]
    fn paginate_sets_cursor_only_when_more_remain() {
        let posts = vec![post("a", 3.0, 1), post("b", 2.0, 1), post("c", 1.0, 1)];

        let page = paginate(posts.clone(), 2);
        assert_eq!(page.posts.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.cursor.as_deref(), Some("b"));

        let page = paginate(posts, 3);
        assert_eq!(page.posts.len(), 3);
        assert!(!page.has_more);
        assert!(page.cursor.is_none());
    }

    #[test]
    fn paginate_never_exceeds_the_limit() {
        let posts: Vec<Post> = (0..50).map(|i| post(&format!("p{}", i), 1.0, 1)).collect();
        let page = paginate(posts, 20);
        assert_eq!(page.posts.len(), 20);
        assert!(page.has_more);
    }

    #[test]
    fn paginate_handles_empty_lists() {
        let page = paginate(Vec::new(), 20);
        assert!(page.posts.is_empty());
        assert!(!page.has_more);
        assert!(page.cursor.is_none());
    }
}
