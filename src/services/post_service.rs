use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::{non_blank, optional_field, parse_id, populate_users};
use crate::auth::policy::{authorize, Action};
use crate::database::models::{Like, Post, PostView, UserView};
use crate::database::Store;
use crate::error::ApiError;

const POST_NOT_FOUND: &str = "Post not found";

#[derive(Debug, Default, Deserialize)]
pub struct CreatePost {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Partial update: absent fields keep their value
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub struct PostService {
    store: Arc<dyn Store>,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, author: &UserView, input: CreatePost) -> Result<PostView, ApiError> {
        let (title, content) = match (non_blank(input.title.as_deref()), non_blank(input.content.as_deref())) {
            (Some(title), Some(content)) => (title, content),
            _ => return Err(ApiError::validation_error("Title and content are required", None)),
        };

        let post = Post::new(title, content, author.id);
        self.store.insert_post(&post).await?;

        tracing::info!("User {} created post {}", author.id, post.id);
        self.view(post).await
    }

    pub async fn list(&self) -> Result<Vec<PostView>, ApiError> {
        let posts = self.store.list_posts().await?;
        self.views(posts).await
    }

    pub async fn get(&self, id: &str) -> Result<PostView, ApiError> {
        let post = self.load(id).await?;
        self.view(post).await
    }

    pub async fn update(&self, user: &UserView, id: &str, input: UpdatePost) -> Result<PostView, ApiError> {
        let mut post = self.load(id).await?;
        authorize(user, Action::Update, &post)?;

        let title = optional_field(input.title.as_deref(), "title")?;
        let content = optional_field(input.content.as_deref(), "content")?;

        if let Some(title) = title {
            post.title = title;
        }
        if let Some(content) = content {
            post.content = content;
        }
        post.updated_at = Utc::now();

        if !self.store.update_post(&post).await? {
            return Err(ApiError::not_found(POST_NOT_FOUND));
        }
        self.view(post).await
    }

    pub async fn delete(&self, user: &UserView, id: &str) -> Result<(), ApiError> {
        let post = self.load(id).await?;
        authorize(user, Action::Delete, &post)?;

        if !self.store.delete_post(post.id).await? {
            return Err(ApiError::not_found(POST_NOT_FOUND));
        }
        tracing::info!("User {} deleted post {}", user.id, post.id);
        Ok(())
    }

    pub async fn like(&self, user: &UserView, id: &str) -> Result<PostView, ApiError> {
        let post = self.load(id).await?;

        if !self.store.add_like(&Like::new(user.id, post.id)).await? {
            return Err(ApiError::conflict("Post already liked"));
        }
        self.view(post).await
    }

    pub async fn unlike(&self, user: &UserView, id: &str) -> Result<PostView, ApiError> {
        let post = self.load(id).await?;

        if !self.store.remove_like(user.id, post.id).await? {
            return Err(ApiError::conflict("Post not liked yet"));
        }
        self.view(post).await
    }

    async fn load(&self, id: &str) -> Result<Post, ApiError> {
        let id = parse_id(id, POST_NOT_FOUND)?;
        self.store
            .find_post(id)
            .await?
            .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))
    }

    async fn view(&self, post: Post) -> Result<PostView, ApiError> {
        let mut views = self.views(vec![post]).await?;
        views.pop().ok_or_else(ApiError::server_error)
    }

    /// Populate authors and derive like sets for a batch of posts
    async fn views(&self, posts: Vec<Post>) -> Result<Vec<PostView>, ApiError> {
        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();

        let mut likes: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for like in self.store.likes_for_posts(&post_ids).await? {
            likes.entry(like.post_id).or_default().push(like.user_id);
        }

        let authors = populate_users(self.store.as_ref(), posts.iter().map(|p| p.author_id)).await?;

        Ok(posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned();
                let likes = likes.remove(&post.id).unwrap_or_default();
                PostView::new(post, author, likes)
            })
            .collect())
    }
}
