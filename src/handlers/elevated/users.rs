// handlers/elevated/users.rs - DELETE /api/users/:id

use axum::extract::{Extension, Path, State};

use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// Remove an account along with its posts, comments and likes
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.users().delete(&admin, &id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
