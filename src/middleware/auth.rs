use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{extract_bearer_token, AuthError, Claims, TokenValidator};

/// State for [`require_permission`]: the validator plus the permission the
/// wrapped route demands.
#[derive(Clone)]
pub struct PermissionGuard {
    validator: Arc<TokenValidator>,
    permission: &'static str,
}

impl PermissionGuard {
    pub fn new(validator: Arc<TokenValidator>, permission: &'static str) -> Self {
        Self { validator, permission }
    }

    pub fn permission(&self) -> &'static str {
        self.permission
    }

    /// Validates the bearer token in `headers` and checks the permission.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = extract_bearer_token(headers)?;
        let claims = self.validator.validate(&token).await?;
        check_permission(&claims, self.permission)?;
        Ok(claims)
    }
}

/// Membership check on the `permissions` claim
pub fn check_permission(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    let granted = claims.permissions.as_ref().ok_or(AuthError::PermissionsMissing)?;

    if granted.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}

/// Route middleware: rejects the request unless it carries a valid token
/// granting the guard's permission, then hands the claims to the handler
/// through request extensions (`Extension<Claims>`).
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = guard.authorize(request.headers()).await.map_err(|err| {
        tracing::warn!(
            "Rejected {} {} (requires {}): {}",
            request.method(),
            request.uri().path(),
            guard.permission(),
            err
        );
        err
    })?;

    tracing::debug!("{} granted {}", claims.subject(), guard.permission());
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
