use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use super::{non_blank, optional_field, parse_id, populate_users};
use crate::auth::policy::{authorize, Action};
use crate::database::models::{AuthorView, Comment, CommentView, UserView};
use crate::database::Store;
use crate::error::ApiError;

const COMMENT_NOT_FOUND: &str = "Comment not found";
const POST_NOT_FOUND: &str = "Post not found";

#[derive(Debug, Default, Deserialize)]
pub struct CreateComment {
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateComment {
    pub content: Option<String>,
}

pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, user: &UserView, post_id: &str, input: CreateComment) -> Result<CommentView, ApiError> {
        let content = non_blank(input.content.as_deref())
            .ok_or_else(|| ApiError::validation_error("Content is required", None))?;

        let post_id = parse_id(post_id, POST_NOT_FOUND)?;
        if self.store.find_post(post_id).await?.is_none() {
            return Err(ApiError::not_found(POST_NOT_FOUND));
        }

        let comment = Comment::new(content, user.id, post_id);
        self.store.insert_comment(&comment).await?;

        tracing::info!("User {} commented {} on post {}", user.id, comment.id, post_id);
        self.view(comment).await
    }

    /// Newest first. An unknown post simply has no comments.
    pub async fn list_for_post(&self, post_id: &str) -> Result<Vec<CommentView>, ApiError> {
        let Ok(post_id) = parse_id(post_id, POST_NOT_FOUND) else {
            return Ok(Vec::new());
        };

        let comments = self.store.comments_for_post(post_id).await?;
        let users = populate_users(self.store.as_ref(), comments.iter().map(|c| c.user_id)).await?;

        Ok(comments
            .into_iter()
            .map(|comment| {
                let user = users.get(&comment.user_id).cloned();
                CommentView::new(comment, user)
            })
            .collect())
    }

    pub async fn update(&self, user: &UserView, id: &str, input: UpdateComment) -> Result<CommentView, ApiError> {
        let mut comment = self.load(id).await?;
        authorize(user, Action::Update, &comment)?;

        if let Some(content) = optional_field(input.content.as_deref(), "content")? {
            comment.content = content;
        }
        comment.updated_at = Utc::now();

        if !self.store.update_comment(&comment).await? {
            return Err(ApiError::not_found(COMMENT_NOT_FOUND));
        }
        self.view(comment).await
    }

    pub async fn delete(&self, user: &UserView, id: &str) -> Result<(), ApiError> {
        let comment = self.load(id).await?;
        authorize(user, Action::Delete, &comment)?;

        if !self.store.delete_comment(comment.id).await? {
            return Err(ApiError::not_found(COMMENT_NOT_FOUND));
        }
        tracing::info!("User {} deleted comment {}", user.id, comment.id);
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Comment, ApiError> {
        let id = parse_id(id, COMMENT_NOT_FOUND)?;
        self.store
            .find_comment(id)
            .await?
            .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))
    }

    async fn view(&self, comment: Comment) -> Result<CommentView, ApiError> {
        let user = self
            .store
            .find_user(comment.user_id)
            .await?
            .map(|u| AuthorView::from(&u));
        Ok(CommentView::new(comment, user))
    }
}
