//! Relevance scoring
//!
//! score = (likes*Wl + comments*Wc + shares*Ws) * exp(-age_hours / T)
//!
//! The decay constant T keeps day-old posts competitive while pushing
//! week-old posts far down regardless of engagement.

use crate::models::PostMetadata;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    pub weight_likes: f64,
    pub weight_comments: f64,
    pub weight_shares: f64,
    pub time_decay_hours: f64,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self {
            weight_likes: 1.0,
            weight_comments: 2.0,
            weight_shares: 3.0,
            time_decay_hours: 24.0,
        }
    }
}

impl RelevanceScorer {
    pub fn new(
        weight_likes: f64,
        weight_comments: f64,
        weight_shares: f64,
        time_decay_hours: f64,
    ) -> Self {
        Self {
            weight_likes,
            weight_comments,
            weight_shares,
            time_decay_hours,
        }
    }

    /// Weighted engagement; absent counts score as zero
    pub fn engagement(&self, post: &PostMetadata) -> f64 {
        post.likes_count.unwrap_or(0) as f64 * self.weight_likes
            + post.comments_count.unwrap_or(0) as f64 * self.weight_comments
            + post.shares_count.unwrap_or(0) as f64 * self.weight_shares
    }

    /// Relevance score at the given instant; always >= 0, and exactly 0 when
    /// the post has no engagement
    pub fn score_at(&self, post: &PostMetadata, now: DateTime<Utc>) -> f64 {
        let engagement = self.engagement(post);
        let age_hours = (now - post.created_at).num_seconds().max(0) as f64 / 3600.0;
        let decay = (-age_hours / self.time_decay_hours).exp();
        engagement * decay
    }

    pub fn score(&self, post: &PostMetadata) -> f64 {
        self.score_at(post, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(likes: i32, comments: i32, shares: i32, age_hours: i64) -> PostMetadata {
        PostMetadata {
            post_id: "p".into(),
            user_id: "u".into(),
            likes_count: Some(likes),
            comments_count: Some(comments),
            shares_count: Some(shares),
            created_at: Utc::now() - Duration::hours(age_hours),
        }
    }

    #[test]
    fn score_is_non_negative_and_zero_without_engagement() {
        let scorer = RelevanceScorer::default();
        let now = Utc::now();

        assert_eq!(scorer.score_at(&post(0, 0, 0, 0), now), 0.0);
        assert_eq!(scorer.score_at(&post(0, 0, 0, 1000), now), 0.0);
        assert!(scorer.score_at(&post(5, 1, 0, 200), now) >= 0.0);
    }

    #[test]
    fn higher_engagement_wins_at_equal_age() {
        let scorer = RelevanceScorer::default();
        let now = Utc::now();
        let a = post(10, 0, 0, 5);
        let mut b = post(5, 0, 0, 5);
        b.created_at = a.created_at;

        assert!(scorer.score_at(&a, now) > scorer.score_at(&b, now));
    }

    #[test]
    fn newer_post_wins_at_equal_engagement() {
        let scorer = RelevanceScorer::default();
        let now = Utc::now();
        let newer = post(5, 2, 1, 1);
        let older = post(5, 2, 1, 10);

        assert!(scorer.score_at(&newer, now) > scorer.score_at(&older, now));
    }

    #[test]
    fn weights_follow_the_engagement_formula() {
        let scorer = RelevanceScorer::default();
        let p = post(1, 1, 1, 0);
        assert_eq!(scorer.engagement(&p), 1.0 + 2.0 + 3.0);
    }

    #[test]
    fn null_counts_are_treated_as_zero() {
        let scorer = RelevanceScorer::default();
        let p = PostMetadata {
            post_id: "p".into(),
            user_id: "u".into(),
            likes_count: None,
            comments_count: Some(2),
            shares_count: None,
            created_at: Utc::now(),
        };
        assert_eq!(scorer.engagement(&p), 4.0);
    }

    #[test]
    fn future_created_at_does_not_inflate_the_score() {
        let scorer = RelevanceScorer::default();
        let now = Utc::now();
        let mut p = post(10, 0, 0, 0);
        p.created_at = now + Duration::hours(5);

        // Negative age clamps to zero, so decay is exactly 1
        assert_eq!(scorer.score_at(&p, now), scorer.engagement(&p));
    }

    #[test]
    fn decay_halves_roughly_every_decay_constant() {
        let scorer = RelevanceScorer::default();
        let now = Utc::now();
        let fresh = post(100, 0, 0, 0);
        let day_old = post(100, 0, 0, 24);

        let ratio = scorer.score_at(&day_old, now) / scorer.score_at(&fresh, now);
        assert!((ratio - (-1.0f64).exp()).abs() < 1e-3);
    }
}
