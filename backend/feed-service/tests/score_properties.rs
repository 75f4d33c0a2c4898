//! Relevance score invariants, swept over a deterministic grid of posts
use chrono::{Duration, Utc};
use feed_service::models::PostMetadata;
use feed_service::RelevanceScorer;

fn post(likes: i32, comments: i32, shares: i32, age_hours: i64) -> PostMetadata {
    PostMetadata {
        post_id: format!("p-{}-{}-{}-{}", likes, comments, shares, age_hours),
        user_id: "author".into(),
        likes_count: Some(likes),
        comments_count: Some(comments),
        shares_count: Some(shares),
        created_at: Utc::now() - Duration::hours(age_hours),
    }
}

fn engagement_grid() -> Vec<(i32, i32, i32)> {
    let mut grid = Vec::new();
    for likes in [0, 1, 10, 500] {
        for comments in [0, 3, 50] {
            for shares in [0, 2, 25] {
                grid.push((likes, comments, shares));
            }
        }
    }
    grid
}

#[test]
fn scores_are_never_negative() {
    let scorer = RelevanceScorer::default();
    let now = Utc::now();

    for (likes, comments, shares) in engagement_grid() {
        for age in [0, 1, 12, 24, 72, 24 * 30] {
            let score = scorer.score_at(&post(likes, comments, shares, age), now);
            assert!(score >= 0.0, "score went negative for {likes}/{comments}/{shares} at {age}h");
        }
    }
}

#[test]
fn zero_engagement_scores_zero_at_any_age() {
    let scorer = RelevanceScorer::default();
    let now = Utc::now();

    for age in [0, 1, 24, 24 * 365] {
        assert_eq!(scorer.score_at(&post(0, 0, 0, age), now), 0.0);
    }
}

#[test]
fn strictly_more_engagement_strictly_outranks_at_equal_age() {
    let scorer = RelevanceScorer::default();
    let now = Utc::now();

    for age in [0, 6, 48] {
        let base = post(10, 5, 2, age);
        for richer in [post(11, 5, 2, age), post(10, 6, 2, age), post(10, 5, 3, age)] {
            let mut richer = richer;
            richer.created_at = base.created_at;
            assert!(
                scorer.score_at(&richer, now) > scorer.score_at(&base, now),
                "extra engagement did not outrank at age {age}h"
            );
        }
    }
}

#[test]
fn newer_strictly_outranks_older_at_equal_positive_engagement() {
    let scorer = RelevanceScorer::default();
    let now = Utc::now();

    for (likes, comments, shares) in engagement_grid() {
        if likes + comments + shares == 0 {
            continue;
        }
        let newer = post(likes, comments, shares, 2);
        let older = post(likes, comments, shares, 30);
        assert!(scorer.score_at(&newer, now) > scorer.score_at(&older, now));
    }
}

#[test]
fn comment_outweighs_like_and_share_outweighs_comment() {
    let scorer = RelevanceScorer::default();
    let now = Utc::now();

    let like_only = post(1, 0, 0, 0);
    let comment_only = post(0, 1, 0, 0);
    let share_only = post(0, 0, 1, 0);

    assert!(scorer.score_at(&comment_only, now) > scorer.score_at(&like_only, now));
    assert!(scorer.score_at(&share_only, now) > scorer.score_at(&comment_only, now));
}
