// handlers/protected/posts.rs - post mutations and likes

use axum::extract::{Extension, Path, State};

use crate::database::models::PostView;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, CurrentUser};
use crate::services::{CreatePost, UpdatePost};
use crate::state::AppState;

/// POST /api/posts - `{title, content}`, author is the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<CreatePost>,
) -> ApiResult<PostView> {
    let post = state.posts().create(&user, payload).await?;
    Ok(ApiResponse::created("post", post).with_message("Post created successfully"))
}

/// PUT /api/posts/:id - owner or admin
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdatePost>,
) -> ApiResult<PostView> {
    let post = state.posts().update(&user, &id, payload).await?;
    Ok(ApiResponse::success("post", post).with_message("Post updated successfully"))
}

/// DELETE /api/posts/:id - owner or admin
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.posts().delete(&user, &id).await?;
    Ok(ApiResponse::message("Post deleted successfully"))
}

/// POST /api/posts/:id/like
pub async fn like(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<PostView> {
    let post = state.posts().like(&user, &id).await?;
    Ok(ApiResponse::success("post", post).with_message("Post liked successfully"))
}

/// DELETE /api/posts/:id/unlike
pub async fn unlike(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<PostView> {
    let post = state.posts().unlike(&user, &id).await?;
    Ok(ApiResponse::success("post", post).with_message("Post unliked successfully"))
}
