use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, State,
    },
    Json,
};
use tracing::info;

use crate::api::{CreateDrink, DeletedDrink, DrinkList, LongDrink, UpdateDrink};
use crate::auth::Claims;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// `/drinks/:id` only matches integer ids
fn drink_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::not_found(rejection.body_text()))
}

async fn all_long(state: &AppState) -> ApiResult<DrinkList<LongDrink>> {
    let drinks = state.store.list_all().await?;
    Ok(ApiResponse::success(DrinkList::long(&drinks)))
}

/// GET /drinks-detail - every drink in the long projection
///
/// Requires `get:drinks-detail`.
pub async fn detail(State(state): State<AppState>) -> ApiResult<DrinkList<LongDrink>> {
    all_long(&state).await
}

/// POST /drinks - insert a drink, then return the whole catalog (long)
///
/// Requires `post:drinks`. Body: `{"title": string, "recipe": [ingredient] | ingredient}`.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateDrink>, JsonRejection>,
) -> ApiResult<DrinkList<LongDrink>> {
    let Json(body) = payload?;
    let drink = state.store.insert(body.into_new_drink()?).await?;

    info!("{} created drink {} ({})", claims.subject(), drink.id, drink.title);
    all_long(&state).await
}

/// PATCH /drinks/:id - partial update, then return the whole catalog (long)
///
/// Requires `patch:drinks`. Missing ids are reported before the body is
/// looked at.
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateDrink>, JsonRejection>,
) -> ApiResult<DrinkList<LongDrink>> {
    let id = drink_id(path)?;
    if state.store.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found(format!("drink {}", id)));
    }

    let Json(body) = payload?;
    let patch = body.into_patch()?;
    if patch.is_empty() {
        info!("{} sent an empty update for drink {}", claims.subject(), id);
    }
    state.store.update_by_id(id, patch).await?;

    info!("{} updated drink {}", claims.subject(), id);
    all_long(&state).await
}

/// DELETE /drinks/:id - returns `{"success": true, "delete": id}`
///
/// Requires `delete:drinks`.
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<DeletedDrink> {
    let id = drink_id(path)?;
    let deleted = state.store.delete_by_id(id).await?;

    info!("{} deleted drink {}", claims.subject(), deleted);
    Ok(ApiResponse::success(DeletedDrink { delete: deleted }))
}
