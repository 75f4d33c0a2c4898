//! Apple Push Notification service client (provider-token auth)
//!
//! Signs an ES256 provider token with the .p8 key (cached; Apple allows
//! reuse for up to an hour) and posts to the HTTP/2 device endpoint.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

/// Apple invalidates provider tokens after 60 minutes; refresh at 50
const TOKEN_LIFETIME_SECS: i64 = 3000;

#[derive(Debug, Error)]
pub enum ApnsError {
    #[error("failed to sign provider token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("APNs API error: {status} - {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, serde::Serialize)]
struct ProviderClaims<'a> {
    iss: &'a str,
    iat: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    issued_at: i64,
}

pub struct ApnsClient {
    key_pem: String,
    key_id: String,
    team_id: String,
    bundle_id: String,
    is_production: bool,
    token_cache: Mutex<Option<CachedToken>>,
    http: reqwest::Client,
}

impl ApnsClient {
    pub fn new(
        key_pem: String,
        key_id: String,
        team_id: String,
        bundle_id: String,
        is_production: bool,
    ) -> Self {
        Self {
            key_pem,
            key_id,
            team_id,
            bundle_id,
            is_production,
            token_cache: Mutex::new(None),
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        if self.is_production {
            "https://api.push.apple.com"
        } else {
            "https://api.sandbox.push.apple.com"
        }
    }

    /// Send one alert notification to one device token
    pub async fn send(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> Result<(), ApnsError> {
        let provider_token = self.provider_token()?;

        let mut payload = json!({
            "aps": {
                "alert": { "title": title, "body": body },
                "sound": "default",
                "badge": 1
            }
        });
        if let (Some(target), Some(extra)) = (payload.as_object_mut(), data.as_object()) {
            for (k, v) in extra {
                target.insert(k.clone(), v.clone());
            }
        }

        let url = format!("{}/3/device/{}", self.endpoint(), device_token);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&provider_token)
            .header("apns-topic", &self.bundle_id)
            .header("apns-priority", "10")
            .header("apns-push-type", "alert")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("APNs push delivered");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApnsError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn provider_token(&self) -> Result<String, ApnsError> {
        let now = Utc::now().timestamp();

        {
            let cache = self.token_cache.lock().unwrap();
            if let Some(cached) = cache.as_ref() {
                if now - cached.issued_at < TOKEN_LIFETIME_SECS {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());
        let claims = ProviderClaims {
            iss: &self.team_id,
            iat: now,
        };
        let key = EncodingKey::from_ec_pem(self.key_pem.as_bytes())?;
        let token = encode(&header, &claims, &key)?;

        let mut cache = self.token_cache.lock().unwrap();
        *cache = Some(CachedToken {
            token: token.clone(),
            issued_at: now,
        });

        Ok(token)
    }
}
