//! Feed page assembly invariants over the ranked candidate list
use chrono::{Duration, Utc};
use feed_service::models::Post;
use feed_service::services::feed_service::{paginate, rank};

fn candidates(n: usize) -> Vec<Post> {
    (0..n)
        .map(|i| Post {
            id: format!("post-{i:04}"),
            user_id: format!("author-{}", i % 7),
            content: String::new(),
            likes_count: (i % 13) as i32,
            comments_count: (i % 5) as i32,
            shares_count: (i % 3) as i32,
            created_at: Utc::now() - Duration::minutes(i as i64),
            relevance_score: ((i * 37) % 101) as f64 / 10.0,
        })
        .collect()
}

#[test]
fn pages_never_exceed_the_requested_limit() {
    for total in [0, 1, 19, 20, 21, 500] {
        for limit in [1, 5, 20] {
            let page = paginate(candidates(total), limit);
            assert!(page.posts.len() <= limit);
        }
    }
}

#[test]
fn a_nonempty_page_with_more_available_always_carries_a_cursor() {
    for total in [2, 25, 100] {
        let page = paginate(candidates(total), 20);
        if page.has_more {
            assert!(!page.posts.is_empty());
            let cursor = page.cursor.expect("has_more without cursor");
            assert_eq!(cursor, page.posts.last().unwrap().id);
        } else {
            assert!(page.cursor.is_none());
        }
    }
}

#[test]
fn exhausted_feeds_report_no_more() {
    let page = paginate(candidates(20), 20);
    assert!(!page.has_more);
    assert!(page.cursor.is_none());
}

#[test]
fn ranking_is_monotonically_decreasing_in_score() {
    let mut posts = candidates(200);
    rank(&mut posts);

    for pair in posts.windows(2) {
        assert!(
            pair[0].relevance_score >= pair[1].relevance_score,
            "rank order violated: {} < {}",
            pair[0].relevance_score,
            pair[1].relevance_score
        );
        if pair[0].relevance_score == pair[1].relevance_score {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
}

#[test]
fn ranking_preserves_the_candidate_set() {
    let mut posts = candidates(50);
    let mut before: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
    rank(&mut posts);
    let mut after: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();

    before.sort();
    after.sort();
    assert_eq!(before, after);
}
