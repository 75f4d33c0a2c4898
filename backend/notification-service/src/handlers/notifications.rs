//! Notification CRUD handlers
use crate::auth::AuthenticatedUser;
use crate::error::{AppError, Result};
use crate::models::Notification;
use crate::services::NotificationService;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub unread_only: bool,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub notifications: Vec<Notification>,
    pub pagination: Pagination,
}

/// List notifications for the current user, newest first
///
/// GET /api/v1/notifications?page&limit&unread_only
pub async fn list_notifications(
    service: web::Data<Arc<NotificationService>>,
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    let (notifications, total) = service
        .list(&user.0, page, limit, query.unread_only)
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        notifications,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        },
    }))
}

/// Fetch a single notification and mark it read
///
/// GET /api/v1/notifications/{id}
pub async fn get_notification(
    service: web::Data<Arc<NotificationService>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    match service.get(&user.0, id).await? {
        Some(notification) => {
            service.mark_read(&user.0, id).await?;
            Ok(HttpResponse::Ok().json(notification))
        }
        None => Err(AppError::NotFound("Notification not found".to_string())),
    }
}

/// Mark a notification as read
///
/// PATCH /api/v1/notifications/{id}/read
pub async fn mark_as_read(
    service: web::Data<Arc<NotificationService>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if service.mark_read(&user.0, path.into_inner()).await? {
        Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
    } else {
        Err(AppError::NotFound("Notification not found".to_string()))
    }
}

/// Delete a notification
///
/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    service: web::Data<Arc<NotificationService>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if service.delete(&user.0, path.into_inner()).await? {
        Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
    } else {
        Err(AppError::NotFound("Notification not found".to_string()))
    }
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/notifications")
            .route("", web::get().to(list_notifications))
            .route("/{id}", web::get().to(get_notification))
            .route("/{id}/read", web::patch().to(mark_as_read))
            .route("/{id}", web::delete().to(delete_notification)),
    );
}
