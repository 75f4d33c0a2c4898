//! Bearer-token authentication for the HTTP surface
//!
//! Tokens are HS256 JWTs issued by the identity service. The user id claim
//! arrives as `userId`, `user_id` or `sub` depending on the issuer version.

use crate::config::Config;
use crate::error::AppError;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default, rename = "userId")]
    user_id_camel: Option<String>,
    #[serde(default)]
    sub: Option<String>,
}

impl Claims {
    fn user_id(self) -> Option<String> {
        self.user_id.or(self.user_id_camel).or(self.sub)
    }
}

/// The authenticated caller, extracted from the Authorization header
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_user(req).map_err(Into::into))
    }
}

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let config = req
        .app_data::<web::Data<Config>>()
        .ok_or_else(|| AppError::Internal("missing service configuration".to_string()))?;

    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization required".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        tracing::warn!("JWT validation failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    decoded
        .claims
        .user_id()
        .map(AuthenticatedUser)
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_prefer_snake_case_then_camel_then_sub() {
        let claims = Claims {
            user_id: Some("snake".into()),
            user_id_camel: Some("camel".into()),
            sub: Some("sub".into()),
        };
        assert_eq!(claims.user_id().as_deref(), Some("snake"));

        let claims = Claims {
            user_id: None,
            user_id_camel: Some("camel".into()),
            sub: Some("sub".into()),
        };
        assert_eq!(claims.user_id().as_deref(), Some("camel"));

        let claims = Claims {
            user_id: None,
            user_id_camel: None,
            sub: Some("sub".into()),
        };
        assert_eq!(claims.user_id().as_deref(), Some("sub"));
    }
}
