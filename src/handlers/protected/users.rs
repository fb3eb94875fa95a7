// handlers/protected/users.rs - GET /api/users/me

use axum::extract::Extension;

use crate::database::models::UserView;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// The authenticated caller's own profile
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiResult<UserView> {
    Ok(ApiResponse::success("user", user))
}
