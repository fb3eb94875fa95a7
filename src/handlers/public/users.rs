// handlers/public/users.rs - GET /api/users/:id

use axum::extract::{Path, State};

use crate::database::models::UserView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Public profile of a user
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserView> {
    let user = state.users().get(&id).await?;
    Ok(ApiResponse::success("user", user))
}
