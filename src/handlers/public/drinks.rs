use axum::extract::State;

use crate::api::{DrinkList, ShortDrink};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /drinks - every drink in the short projection, no auth required
pub async fn list(State(state): State<AppState>) -> ApiResult<DrinkList<ShortDrink>> {
    let drinks = state.store.list_all().await?;
    Ok(ApiResponse::success(DrinkList::short(&drinks)))
}
