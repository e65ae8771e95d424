// HTTP API Error Types
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::manager::DatabaseError;

/// HTTP API error. Each variant carries an internal detail for logs; clients
/// only see the fixed message for the status.
#[derive(Debug)]
pub enum ApiError {
    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 422 Unprocessable Entity (malformed body, type mismatch, conflicting title)
    UnprocessableEntity(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-facing message
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "resource not found",
            ApiError::MethodNotAllowed(_) => "method not allowed",
            ApiError::UnprocessableEntity(_) => "unprocessable",
            ApiError::InternalServerError(_) => "internal server error",
            ApiError::ServiceUnavailable(_) => "service unavailable",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ApiError::NotFound(detail)
            | ApiError::MethodNotAllowed(detail)
            | ApiError::UnprocessableEntity(detail)
            | ApiError::InternalServerError(detail)
            | ApiError::ServiceUnavailable(detail) => detail,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.status_code().as_u16(),
            "message": self.message(),
        })
    }
}

impl ApiError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        ApiError::NotFound(detail.into())
    }

    pub fn method_not_allowed(detail: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed(detail.into())
    }

    pub fn unprocessable_entity(detail: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(detail.into())
    }

    pub fn internal_server_error(detail: impl Into<String>) -> Self {
        ApiError::InternalServerError(detail.into())
    }

    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(detail.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(msg) | DatabaseError::Invalid(msg) => ApiError::unprocessable_entity(msg),
            unreachable @ DatabaseError::Sqlx(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => {
                tracing::error!("Database unreachable: {}", unreachable);
                ApiError::service_unavailable(unreachable.to_string())
            }
            other => {
                // Log the real error but return generic message
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::unprocessable_entity(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.message(), self.detail())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        tracing::debug!("Request failed: {}", self);
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_envelope() {
        let err = ApiError::not_found("drink 5");
        assert_eq!(
            err.to_json(),
            json!({"success": false, "error": 404, "message": "resource not found"})
        );
    }

    #[test]
    fn conflict_maps_to_422() {
        let err: ApiError = DatabaseError::Conflict("duplicate title".into()).into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_json()["message"], "unprocessable");

        let err: ApiError = DatabaseError::Invalid("title too long".into()).into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn storage_failures_do_not_leak() {
        let err: ApiError = DatabaseError::Sqlx(sqlx::Error::RowNotFound).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_json()["message"], "internal server error");

        let err: ApiError = DatabaseError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
