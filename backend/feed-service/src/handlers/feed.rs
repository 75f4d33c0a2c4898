//! Feed, score and trending handlers
use crate::error::Result;
use crate::models::{ScoreRequest, ScoreResponse};
use crate::services::FeedService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub cursor: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

/// Ranked feed page for a user
///
/// GET /api/v1/feed/{user_id}?cursor&limit
pub async fn get_feed(
    service: web::Data<Arc<FeedService>>,
    path: web::Path<String>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    let cursor = query.cursor.as_deref().filter(|c| !c.is_empty());

    let feed = service.generate_feed(&user_id, cursor, query.limit).await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// Relevance score for one post
///
/// POST /api/v1/score
pub async fn calculate_score(
    service: web::Data<Arc<FeedService>>,
    body: web::Json<ScoreRequest>,
) -> Result<HttpResponse> {
    let score = service.calculate_score(&body.post_id).await?;
    Ok(HttpResponse::Ok().json(ScoreResponse {
        post_id: body.post_id.clone(),
        relevance_score: score,
    }))
}

/// Globally popular posts for users who follow no-one
///
/// GET /api/v1/trending?limit
pub async fn get_trending(
    service: web::Data<Arc<FeedService>>,
    query: web::Query<TrendingQuery>,
) -> Result<HttpResponse> {
    let feed = service.trending(query.limit).await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// Drop the cached feed for a user
///
/// POST /api/v1/invalidate-cache/{user_id}
pub async fn invalidate_cache(
    service: web::Data<Arc<FeedService>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    service.invalidate_user_cache(&user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "message": format!("Cache invalidated for user {}", user_id)
    })))
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/feed/{user_id}", web::get().to(get_feed))
            .route("/score", web::post().to(calculate_score))
            .route("/trending", web::get().to(get_trending))
            .route("/invalidate-cache/{user_id}", web::post().to(invalidate_cache)),
    );
}
