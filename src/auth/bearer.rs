//! Bearer token plugin: HS256 JWTs carrying the caller's roles.

use crate::auth::{Authentication, AuthenticationLibrary, Caller};
use crate::config::Settings;
use crate::error::{AppError, RoadworkError};
use crate::orm::Orm;
use async_trait::async_trait;
use axum::http::{header, request::Parts};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const BEARER_PLUGIN_NAME: &str = "roadwork-bearer";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

/// Library handed to `Roadwork::add_authentication`.
#[derive(Clone)]
pub struct BearerLibrary {
    secret: String,
}

impl BearerLibrary {
    pub fn new(secret: impl Into<String>) -> Self {
        BearerLibrary { secret: secret.into() }
    }

    /// None when `JWT_SECRET` is not configured.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        settings.jwt_secret.clone().map(BearerLibrary::new)
    }
}

impl AuthenticationLibrary for BearerLibrary {
    fn build(self, connection: Arc<dyn Orm>) -> Result<Arc<dyn Authentication>, RoadworkError> {
        Ok(Arc::new(BearerAuthentication {
            decoding_key: DecodingKey::from_secret(self.secret.as_bytes()),
            has_secret: !self.secret.is_empty(),
            connection,
        }))
    }
}

pub struct BearerAuthentication {
    decoding_key: DecodingKey,
    has_secret: bool,
    connection: Arc<dyn Orm>,
}

#[async_trait]
impl Authentication for BearerAuthentication {
    fn name(&self) -> &str {
        BEARER_PLUGIN_NAME
    }

    async fn init(&self) -> Result<(), RoadworkError> {
        if !self.has_secret {
            return Err(RoadworkError::Authentication("missing signing secret".into()));
        }
        self.connection
            .ping()
            .await
            .map_err(|e| RoadworkError::Authentication(format!("database connection unavailable: {}", e)))?;
        tracing::info!("[x] Database scheme is valid");
        Ok(())
    }

    async fn authenticate(&self, parts: &Parts) -> Result<Caller, AppError> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;

        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| AppError::Unauthorized(format!("invalid token: {}", e)))?;
        Ok(Caller {
            subject: data.claims.sub,
            roles: data.claims.roles,
        })
    }
}

/// Sign a token for `subject` with `roles`, valid for `ttl`.
pub fn issue_token(secret: &str, subject: &str, roles: &[&str], ttl: chrono::Duration) -> Result<String, RoadworkError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: subject.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: (now + ttl).timestamp().max(0) as usize,
        iat: now.timestamp().max(0) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| RoadworkError::Authentication(format!("token signing failed: {}", e)))
}
