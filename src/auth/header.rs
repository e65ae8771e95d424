use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::error::AuthError;

/// Pulls the raw token out of `Authorization: Bearer <token>`.
///
/// The header must be exactly two space-separated parts and the scheme must
/// be `Bearer` (case-insensitive).
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("Authorization header must be bearer token."))?;

    // Single spaces only: doubled spaces or tabs make extra parts
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::MalformedHeader(
            "Authorization header must start with \"Bearer\".",
        )),
        [_] | [_, ""] => Err(AuthError::MalformedHeader("Token not found.")),
        [_, token] => Ok((*token).to_string()),
        _ => Err(AuthError::MalformedHeader("Authorization header must be bearer token.")),
    }
}
