//! Pluggable authentication: plugins resolve the caller, generated routes check roles.

mod bearer;

pub use bearer::{issue_token, BearerAuthentication, BearerLibrary, Claims, BEARER_PLUGIN_NAME};

use crate::error::{AppError, RoadworkError};
use crate::orm::Orm;
use async_trait::async_trait;
use axum::http::request::Parts;
use std::sync::Arc;

/// Identity resolved by a plugin for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub subject: String,
    pub roles: Vec<String>,
}

impl Caller {
    pub fn has_any_role(&self, allowed: &[String]) -> bool {
        self.roles.iter().any(|r| allowed.contains(r))
    }
}

/// An installed authentication plugin.
#[async_trait]
pub trait Authentication: Send + Sync {
    /// The adapter registers each plugin name once.
    fn name(&self) -> &str;

    /// One-time setup after registration (keys, tables, connectivity).
    async fn init(&self) -> Result<(), RoadworkError>;

    /// Resolve the caller from the request, or reject with `AppError::Unauthorized`.
    async fn authenticate(&self, parts: &Parts) -> Result<Caller, AppError>;
}

/// Builds a plugin bound to the shared connection.
pub trait AuthenticationLibrary {
    fn build(self, connection: Arc<dyn Orm>) -> Result<Arc<dyn Authentication>, RoadworkError>;
}

impl<F> AuthenticationLibrary for F
where
    F: FnOnce(Arc<dyn Orm>) -> Result<Arc<dyn Authentication>, RoadworkError>,
{
    fn build(self, connection: Arc<dyn Orm>) -> Result<Arc<dyn Authentication>, RoadworkError> {
        self(connection)
    }
}

/// Check the caller against `allowed_roles`. No plugin or no roles means the route is public.
pub async fn authorize(
    authentication: Option<&dyn Authentication>,
    allowed_roles: &[String],
    parts: &Parts,
) -> Result<Option<Caller>, AppError> {
    let Some(authentication) = authentication else {
        return Ok(None);
    };
    if allowed_roles.is_empty() {
        return Ok(None);
    }
    let caller = authentication.authenticate(parts).await?;
    if !caller.has_any_role(allowed_roles) {
        tracing::warn!(subject = %caller.subject, roles = ?caller.roles, allowed = ?allowed_roles, "role check failed");
        return Err(AppError::Forbidden(format!(
            "requires one of: {}",
            allowed_roles.join(", ")
        )));
    }
    Ok(Some(caller))
}
