use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Wrapper for API responses that adds `"success": true` to the payload
/// object, e.g. `{"success": true, "drinks": [...]}`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with 200 status
    pub fn success(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut fields = match serde_json::to_value(&self.data) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                tracing::error!("Response payload is not an object: {}", other);
                return ApiError::internal_server_error("non-object response payload").into_response();
            }
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::internal_server_error(e.to_string()).into_response();
            }
        };
        fields.insert("success".to_string(), Value::Bool(true));

        (StatusCode::OK, Json(Value::Object(fields))).into_response()
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
