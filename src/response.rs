//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: MetaCount,
}

#[derive(Serialize)]
pub struct MetaCount {
    pub count: u64,
}

#[derive(Serialize)]
pub struct SuccessPage<T> {
    pub data: Vec<T>,
    pub meta: MetaPagination,
}

#[derive(Serialize)]
pub struct MetaPagination {
    pub pagination: Pagination,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
    pub row_count: u64,
    pub page_count: u64,
}

pub fn success_created<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::CREATED, Json(SuccessOne { data }))
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::OK, Json(SuccessOne { data }))
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<SuccessMany<T>>) {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(SuccessMany {
            data,
            meta: MetaCount { count },
        }),
    )
}

pub fn success_page<T: Serialize>(data: Vec<T>, pagination: Pagination) -> (StatusCode, Json<SuccessPage<T>>) {
    (
        StatusCode::OK,
        Json(SuccessPage {
            data,
            meta: MetaPagination { pagination },
        }),
    )
}
