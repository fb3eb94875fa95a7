// handlers/protected/comments.rs - comment mutations

use axum::extract::{Extension, Path, State};

use crate::database::models::CommentView;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, CurrentUser};
use crate::services::{CreateComment, UpdateComment};
use crate::state::AppState;

/// POST /api/comments/:postId - `{content}`
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(post_id): Path<String>,
    ApiJson(payload): ApiJson<CreateComment>,
) -> ApiResult<CommentView> {
    let comment = state.comments().create(&user, &post_id, payload).await?;
    Ok(ApiResponse::created("comment", comment).with_message("Comment created successfully"))
}

/// PUT /api/comments/:id - owner or admin
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateComment>,
) -> ApiResult<CommentView> {
    let comment = state.comments().update(&user, &id, payload).await?;
    Ok(ApiResponse::success("comment", comment).with_message("Comment updated successfully"))
}

/// DELETE /api/comments/:id - owner or admin
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.comments().delete(&user, &id).await?;
    Ok(ApiResponse::message("Comment deleted successfully"))
}
