//! Firebase Cloud Messaging HTTP v1 client
//!
//! Exchanges the service-account key for a short-lived OAuth2 access token
//! (cached until close to expiry) and posts notification messages to the
//! `messages:send` endpoint.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
/// Refresh the cached token one minute before Google expires it
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum FcmError {
    #[error("failed to sign service-account assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("FCM API error: {status} - {body}")]
    Api { status: u16, body: String },
}

/// Firebase service account key (the JSON file Google issues)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub token_uri: String,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    message: FcmMessageBody<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessageBody<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

pub struct FcmClient {
    credentials: ServiceAccountKey,
    token_cache: Mutex<Option<CachedToken>>,
    http: reqwest::Client,
}

impl FcmClient {
    pub fn new(credentials: ServiceAccountKey) -> Self {
        Self {
            credentials,
            token_cache: Mutex::new(None),
            http: reqwest::Client::new(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.credentials.project_id
    }

    /// Send one notification to one device token
    pub async fn send(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: Option<&serde_json::Value>,
    ) -> Result<(), FcmError> {
        let access_token = self.access_token().await?;

        let message = FcmMessage {
            message: FcmMessageBody {
                token: device_token,
                notification: FcmNotification { title, body },
                data,
            },
        };

        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.credentials.project_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&access_token)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("FCM push delivered");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(FcmError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn access_token(&self) -> Result<String, FcmError> {
        let now = Utc::now().timestamp();

        {
            let cache = self.token_cache.lock().unwrap();
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at - TOKEN_EXPIRY_SLACK_SECS > now {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let claims = AssertionClaims {
            iss: &self.credentials.client_email,
            scope: FCM_SCOPE,
            aud: &self.credentials.token_uri,
            exp: now + 3600,
            iat: now,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.credentials.private_key_id.clone());
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())?;
        let assertion = encode(&header, &claims, &key)?;

        let response = self
            .http
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FcmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;

        let mut cache = self.token_cache.lock().unwrap();
        *cache = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });

        Ok(token.access_token)
    }
}
