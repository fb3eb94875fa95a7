// handlers/public/posts.rs - GET /api/posts, GET /api/posts/:id

use axum::extract::{Path, State};

use crate::database::models::PostView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/posts - all posts, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<PostView>> {
    let posts = state.posts().list().await?;
    Ok(ApiResponse::success("posts", posts))
}

/// GET /api/posts/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PostView> {
    let post = state.posts().get(&id).await?;
    Ok(ApiResponse::success("post", post))
}
