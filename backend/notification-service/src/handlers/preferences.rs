//! Notification preference handlers
use crate::auth::AuthenticatedUser;
use crate::error::Result;
use crate::models::{PreferencesUpdate, PushTokenRequest};
use crate::services::NotificationService;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// Get the current user's notification preferences
///
/// GET /api/v1/preferences
pub async fn get_preferences(
    service: web::Data<Arc<NotificationService>>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let prefs = service.get_preferences(&user.0).await?;
    Ok(HttpResponse::Ok().json(prefs))
}

/// Update notification preferences (only provided fields change)
///
/// PUT /api/v1/preferences
pub async fn update_preferences(
    service: web::Data<Arc<NotificationService>>,
    user: AuthenticatedUser,
    body: web::Json<PreferencesUpdate>,
) -> Result<HttpResponse> {
    let prefs = service.update_preferences(&user.0, &body).await?;
    Ok(HttpResponse::Ok().json(prefs))
}

/// Register an FCM or APNs device token
///
/// POST /api/v1/preferences/push-token
pub async fn register_push_token(
    service: web::Data<Arc<NotificationService>>,
    user: AuthenticatedUser,
    body: web::Json<PushTokenRequest>,
) -> Result<HttpResponse> {
    service
        .register_push_token(&user.0, &body.token, &body.platform)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/preferences")
            .route("", web::get().to(get_preferences))
            .route("", web::put().to(update_preferences))
            .route("/push-token", web::post().to(register_push_token)),
    );
}
