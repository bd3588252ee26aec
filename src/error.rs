//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while wiring routes: construction, option validation, plugin setup.
#[derive(Error, Debug)]
pub enum RoadworkError {
    #[error("No http engine given!")]
    NoHttpEngine,
    #[error("database connection not started")]
    MissingConnection,
    #[error("Invalid Base Model Specified")]
    InvalidBaseModel,
    #[error("invalid identifier for {kind}: '{value}'")]
    InvalidIdentifier { kind: &'static str, value: String },
    #[error("ValidationError: {0}")]
    Validation(String),
    #[error("route already registered: {method} {path}")]
    DuplicateRoute { method: String, path: String },
    #[error("Missing the authenticationLibrary")]
    MissingAuthenticationLibrary,
    #[error("authentication: {0}")]
    Authentication(String),
}

/// Errors raised while serving a generated route.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_errors_keep_their_messages() {
        assert_eq!(RoadworkError::NoHttpEngine.to_string(), "No http engine given!");
        assert_eq!(
            RoadworkError::MissingConnection.to_string(),
            "database connection not started"
        );
        assert_eq!(
            RoadworkError::Validation("\"something\" is not allowed".into()).to_string(),
            "ValidationError: \"something\" is not allowed"
        );
    }

    #[test]
    fn error_body_carries_code_and_message_only() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "not_found".into(),
                message: "not found: widget 7".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "error": { "code": "not_found", "message": "not found: widget 7" } })
        );
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let (status, code) = AppError::Db(sqlx::Error::RowNotFound).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "not_found");
    }
}
