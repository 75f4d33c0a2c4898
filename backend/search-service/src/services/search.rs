//! Fuzzy search query composition and execution
//!
//! Each type gets a bool/should disjunction with scored boosts so exact
//! matches outrank fuzzy ones, executed against its index under a hard
//! timeout. The untyped search fans out to all three indices concurrently.

use crate::error::{AppError, Result};
use crate::es::{EsClient, HASHTAGS_INDEX, POSTS_INDEX, USERS_INDEX};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Serialize)]
pub struct TypedSearchResults {
    #[serde(rename = "type")]
    pub result_type: &'static str,
    pub results: Vec<Value>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct AllResults {
    pub posts: Vec<Value>,
    pub users: Vec<Value>,
    pub hashtags: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct AllTotals {
    pub posts: i64,
    pub users: i64,
    pub hashtags: i64,
}

#[derive(Debug, Serialize)]
pub struct AllSearchResults {
    #[serde(rename = "type")]
    pub result_type: &'static str,
    pub results: AllResults,
    pub total: AllTotals,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchResults {
    Typed(TypedSearchResults),
    All(AllSearchResults),
}

pub struct SearchService {
    es: EsClient,
    timeout: Duration,
}

impl SearchService {
    pub fn new(es: EsClient, timeout: Duration) -> Self {
        Self { es, timeout }
    }

    /// Execute a search
    ///
    /// `q` must be at least two characters; `search_type` of None queries
    /// all three indices concurrently with a fixed first page.
    pub async fn search(
        &self,
        q: &str,
        search_type: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<SearchResults> {
        if q.chars().count() < 2 {
            return Err(AppError::QueryTooShort);
        }

        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);
        let from = (page - 1) * page_size;

        match search_type {
            Some("posts") => {
                let (results, total) = self
                    .run(POSTS_INDEX, posts_query(q, from, page_size))
                    .await?;
                Ok(SearchResults::Typed(typed_results(
                    "posts", results, total, page, page_size, from,
                )))
            }
            Some("users") => {
                let (results, total) = self
                    .run(USERS_INDEX, users_query(q, from, page_size))
                    .await?;
                Ok(SearchResults::Typed(typed_results(
                    "users", results, total, page, page_size, from,
                )))
            }
            Some("hashtags") => {
                let (results, total) = self
                    .run(HASHTAGS_INDEX, hashtags_query(q, from, page_size))
                    .await?;
                Ok(SearchResults::Typed(typed_results(
                    "hashtags", results, total, page, page_size, from,
                )))
            }
            None => self.search_all(q, page_size).await,
            Some(_) => Err(AppError::InvalidType),
        }
    }

    /// Concurrent fan-out to all three indices, each with a share of the page
    async fn search_all(&self, q: &str, page_size: i64) -> Result<SearchResults> {
        let per_type = per_type_size(page_size);

        let (posts, users, hashtags) = tokio::join!(
            self.run(POSTS_INDEX, posts_query(q, 0, per_type)),
            self.run(USERS_INDEX, users_query(q, 0, per_type)),
            self.run(HASHTAGS_INDEX, hashtags_query(q, 0, per_type)),
        );

        let (posts, posts_total) = posts?;
        let (users, users_total) = users?;
        let (hashtags, hashtags_total) = hashtags?;

        Ok(SearchResults::All(AllSearchResults {
            result_type: "all",
            results: AllResults {
                posts,
                users,
                hashtags,
            },
            total: AllTotals {
                posts: posts_total,
                users: users_total,
                hashtags: hashtags_total,
            },
            page: 1,
            page_size,
        }))
    }

    async fn run(&self, index: &str, body: Value) -> Result<(Vec<Value>, i64)> {
        match tokio::time::timeout(self.timeout, self.es.search(index, body)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AppError::SearchTimeout),
        }
    }
}

fn typed_results(
    result_type: &'static str,
    results: Vec<Value>,
    total: i64,
    page: i64,
    page_size: i64,
    from: i64,
) -> TypedSearchResults {
    TypedSearchResults {
        result_type,
        results,
        total,
        page,
        page_size,
        has_more: from + page_size < total,
    }
}

/// Each type's share of an all-types page
pub fn per_type_size(page_size: i64) -> i64 {
    page_size / 3 + 1
}

/// Lowercase the query and strip a leading `#`
pub fn normalize_tag_query(q: &str) -> String {
    q.to_lowercase().trim_start_matches('#').to_string()
}

/// Posts: exact content (3.0) ∨ fuzzy content (1.0) ∨ hashtag term (2.0),
/// sorted by score then recency
pub fn posts_query(q: &str, from: i64, size: i64) -> Value {
    json!({
        "query": {
            "bool": {
                "should": [
                    { "match": { "content": { "query": q, "boost": 3.0 } } },
                    { "match": { "content": { "query": q, "fuzziness": "AUTO", "boost": 1.0 } } },
                    { "term": { "hashtags": { "value": normalize_tag_query(q), "boost": 2.0 } } }
                ],
                "minimum_should_match": 1
            }
        },
        "from": from,
        "size": size,
        "sort": [
            { "_score": { "order": "desc" } },
            { "created_at": { "order": "desc" } }
        ]
    })
}

/// Users: exact name (3.0) ∨ fuzzy name (2.0) ∨ fuzzy bio (1.0), sorted by
/// score then follower count
pub fn users_query(q: &str, from: i64, size: i64) -> Value {
    json!({
        "query": {
            "bool": {
                "should": [
                    { "match": { "name": { "query": q, "boost": 3.0 } } },
                    { "match": { "name": { "query": q, "fuzziness": "AUTO", "boost": 2.0 } } },
                    { "match": { "bio": { "query": q, "fuzziness": "AUTO", "boost": 1.0 } } }
                ],
                "minimum_should_match": 1
            }
        },
        "from": from,
        "size": size,
        "sort": [
            { "_score": { "order": "desc" } },
            { "followers_count": { "order": "desc" } }
        ]
    })
}

/// Hashtags: prefix (3.0) ∨ fuzzy (1.0) on the normalized tag, sorted by
/// score, then usage, then recency
pub fn hashtags_query(q: &str, from: i64, size: i64) -> Value {
    let tag = normalize_tag_query(q);
    json!({
        "query": {
            "bool": {
                "should": [
                    { "prefix": { "tag": { "value": tag, "boost": 3.0 } } },
                    { "fuzzy": { "tag": { "value": tag, "fuzziness": "AUTO", "boost": 1.0 } } }
                ],
                "minimum_should_match": 1
            }
        },
        "from": from,
        "size": size,
        "sort": [
            { "_score": { "order": "desc" } },
            { "posts_count": { "order": "desc" } },
            { "last_used": { "order": "desc" } }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_queries_are_lowercased_and_stripped() {
        assert_eq!(normalize_tag_query("#Carnaval"), "carnaval");
        assert_eq!(normalize_tag_query("Rust"), "rust");
        assert_eq!(normalize_tag_query("##dupla"), "dupla");
    }

    #[test]
    fn posts_query_combines_exact_fuzzy_and_hashtag_clauses() {
        let body = posts_query("experiance", 0, 20);
        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 3);

        assert_eq!(should[0]["match"]["content"]["boost"], 3.0);
        assert_eq!(should[1]["match"]["content"]["fuzziness"], "AUTO");
        assert_eq!(should[1]["match"]["content"]["boost"], 1.0);
        assert_eq!(should[2]["term"]["hashtags"]["value"], "experiance");
        assert_eq!(should[2]["term"]["hashtags"]["boost"], 2.0);

        assert_eq!(body["query"]["bool"]["minimum_should_match"], 1);
        assert_eq!(body["sort"][1]["created_at"]["order"], "desc");
    }

    #[test]
    fn users_query_sorts_by_score_then_followers() {
        let body = users_query("maria", 20, 10);
        assert_eq!(body["from"], 20);
        assert_eq!(body["size"], 10);
        assert_eq!(body["sort"][0]["_score"]["order"], "desc");
        assert_eq!(body["sort"][1]["followers_count"]["order"], "desc");
    }

    #[test]
    fn hashtags_query_prefers_prefix_over_fuzzy() {
        let body = hashtags_query("#Carna", 0, 20);
        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should[0]["prefix"]["tag"]["value"], "carna");
        assert_eq!(should[0]["prefix"]["tag"]["boost"], 3.0);
        assert_eq!(should[1]["fuzzy"]["tag"]["boost"], 1.0);
        assert_eq!(body["sort"][2]["last_used"]["order"], "desc");
    }

    #[test]
    fn per_type_size_gives_each_type_a_share_plus_one() {
        assert_eq!(per_type_size(20), 7);
        assert_eq!(per_type_size(3), 2);
        assert_eq!(per_type_size(1), 1);
    }

    #[test]
    fn has_more_reflects_remaining_results() {
        let r = typed_results("posts", vec![], 50, 1, 20, 0);
        assert!(r.has_more);
        let r = typed_results("posts", vec![], 20, 1, 20, 0);
        assert!(!r.has_more);
        let r = typed_results("posts", vec![], 50, 3, 20, 40);
        assert!(!r.has_more);
    }
}
