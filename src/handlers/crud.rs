//! Generated route handlers: one per route kind, each bound to a model through `RouteContext`.

use crate::config::MAX_PAGE_LIMIT;
use crate::error::AppError;
use crate::extractors::Authorized;
use crate::response::{success_created, success_many, success_one_ok, success_page};
use crate::state::RouteContext;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
}

fn body_to_map(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Offsets above `i64::MAX` do not fit a PostgreSQL bigint.
fn parse_offset(s: &str) -> Result<u64, AppError> {
    s.parse::<u64>()
        .ok()
        .filter(|&offset| i64::try_from(offset).is_ok())
        .ok_or_else(|| AppError::BadRequest("offset must be a non-negative integer".into()))
}

fn parse_limit(raw: Option<&str>, default_limit: u64) -> Result<u64, AppError> {
    let limit = match raw {
        None => default_limit,
        Some(s) => s
            .parse::<u64>()
            .map_err(|_| AppError::BadRequest("limit must be a positive integer".into()))?,
    };
    Ok(limit.clamp(1, MAX_PAGE_LIMIT))
}

fn not_found(ctx: &RouteContext, id: &str) -> AppError {
    AppError::NotFound(format!("{} {}", ctx.model.table_name(), id))
}

pub async fn find_all(
    State(ctx): State<RouteContext>,
    _caller: Authorized,
) -> Result<impl IntoResponse, AppError> {
    let rows = ctx.model.find_all().await?;
    Ok(success_many(rows))
}

pub async fn find_all_with_pagination(
    State(ctx): State<RouteContext>,
    _caller: Authorized,
    Path(offset): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let offset = parse_offset(&offset)?;
    let limit = parse_limit(query.limit.as_deref(), ctx.default_page_limit)?;
    let page = ctx.model.find_page(offset, limit).await?;
    let pagination = page.pagination();
    Ok(success_page(page.rows, pagination))
}

pub async fn find_one(
    State(ctx): State<RouteContext>,
    _caller: Authorized,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = ctx.model.find_one(&id).await?.ok_or_else(|| not_found(&ctx, &id))?;
    Ok(success_one_ok(row))
}

pub async fn create(
    State(ctx): State<RouteContext>,
    _caller: Authorized,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let row = ctx.model.create(&body).await?;
    Ok(success_created(row))
}

pub async fn update(
    State(ctx): State<RouteContext>,
    _caller: Authorized,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let row = ctx.model.update(&id, &body).await?.ok_or_else(|| not_found(&ctx, &id))?;
    Ok(success_one_ok(row))
}

pub async fn delete(
    State(ctx): State<RouteContext>,
    _caller: Authorized,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    ctx.model.destroy(&id).await?.ok_or_else(|| not_found(&ctx, &id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn count(
    State(ctx): State<RouteContext>,
    _caller: Authorized,
) -> Result<impl IntoResponse, AppError> {
    let count = ctx.model.count().await?;
    Ok(success_one_ok(serde_json::json!({ "count": count })))
}
