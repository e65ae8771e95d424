use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Token validation and permission failures.
///
/// Serialized to clients as `{"code": ..., "description": ...}`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,

    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("Authorization malformed.")]
    MissingKeyId,

    #[error("Unable to find the appropriate key.")]
    NoMatchingKey,

    #[error("Token signature could not be verified.")]
    InvalidSignature,

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Unable to parse authentication token.")]
    Malformed,

    #[error("Permissions not included in JWT.")]
    PermissionsMissing,

    #[error("Permission not found.")]
    PermissionDenied,

    #[error("Signing keys are unavailable: {0}")]
    KeySetUnavailable(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::MalformedHeader(_) => "invalid_header",
            AuthError::MissingKeyId => "invalid_header",
            AuthError::NoMatchingKey => "invalid_header",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::Malformed => "invalid_header",
            AuthError::PermissionsMissing => "invalid_claims",
            AuthError::PermissionDenied => "unauthorized",
            AuthError::KeySetUnavailable(_) => "jwks_unavailable",
        }
    }

    /// Every caller-side failure is 401, including a valid token that lacks
    /// the permission. Only an unreachable key set is reported as 503.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::KeySetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn description(&self) -> String {
        match self {
            // Don't leak upstream details
            AuthError::KeySetUnavailable(_) => "Unable to verify tokens at this time.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::KeySetUnavailable(detail) = &self {
            tracing::error!("JWKS unavailable: {}", detail);
        }
        let body = json!({
            "code": self.code(),
            "description": self.description(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
