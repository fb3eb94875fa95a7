// handlers/public/comments.rs - GET /api/comments/:postId

use axum::extract::{Path, State};

use crate::database::models::CommentView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Comments on a post, newest first
pub async fn list_for_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<Vec<CommentView>> {
    let comments = state.comments().list_for_post(&post_id).await?;
    Ok(ApiResponse::success("comments", comments))
}
