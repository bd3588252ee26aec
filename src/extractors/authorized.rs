//! Enforce the route's role requirement before the handler runs.

use crate::auth::{authorize, Caller};
use crate::error::AppError;
use crate::state::RouteContext;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// The authorized caller, or None on a public route.
#[derive(Clone, Debug)]
pub struct Authorized(pub Option<Caller>);

#[async_trait]
impl FromRequestParts<RouteContext> for Authorized {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, ctx: &RouteContext) -> Result<Self, Self::Rejection> {
        let caller = authorize(ctx.authentication.as_deref(), &ctx.allowed_roles, parts).await?;
        Ok(Authorized(caller))
    }
}
