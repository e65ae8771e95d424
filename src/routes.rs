use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, Uri,
    },
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::permissions::{DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS};
use crate::config::{Environment, SecurityConfig};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{require_permission, PermissionGuard};
use crate::state::AppState;

/// Builds the full router around an application state.
pub fn app(state: AppState) -> Router {
    let validator = state.validator.clone();
    let guard = |permission: &'static str| {
        middleware::from_fn_with_state(PermissionGuard::new(validator.clone(), permission), require_permission)
    };

    let cors = cors_layer(state.config.environment, &state.config.security);

    Router::new()
        // Public
        .route("/health", get(public::health))
        // GET is public, POST needs post:drinks
        .route(
            "/drinks",
            get(public::list_drinks).merge(post(protected::create_drink).route_layer(guard(POST_DRINKS))),
        )
        .route(
            "/drinks-detail",
            get(protected::drinks_detail).route_layer(guard(GET_DRINKS_DETAIL)),
        )
        .route(
            "/drinks/:id",
            patch(protected::update_drink)
                .route_layer(guard(PATCH_DRINKS))
                .merge(delete(protected::delete_drink).route_layer(guard(DELETE_DRINKS))),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("no such route")
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::method_not_allowed(format!("{} {}", method, uri.path()))
}

fn cors_layer(environment: Environment, security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
