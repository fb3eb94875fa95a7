use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Comment, Like, Post, User};
use super::store::Store;

/// In-process store used when no database is configured, and by tests.
///
/// Posts and comments are kept in insertion order so "newest first" is a
/// reverse scan. Every operation takes the single lock once, which makes
/// each call atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
}

impl Collections {
    fn drop_posts_where(&mut self, doomed: impl Fn(&Post) -> bool) {
        let removed: Vec<Uuid> = self.posts.iter().filter(|p| doomed(p)).map(|p| p.id).collect();
        self.posts.retain(|p| !removed.contains(&p.id));
        self.comments.retain(|c| !removed.contains(&c.post_id));
        self.likes.retain(|l| !removed.contains(&l.post_id));
    }
}

impl Collections {
    /// Parent check made under the same write lock as the insert
    fn require_parents(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DatabaseError> {
        if !self.posts.iter().any(|p| p.id == post_id) {
            return Err(DatabaseError::NotFound("Post not found"));
        }
        if !self.users.contains_key(&user_id) {
            return Err(DatabaseError::NotFound("User not found"));
        }
        Ok(())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        let _guard = self.inner.read().await;
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Duplicate("User already exists".to_string()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| inner.users.get(id).cloned()).collect())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }
        inner.drop_posts_where(|p| p.author_id == id);
        inner.comments.retain(|c| c.user_id != id);
        inner.likes.retain(|l| l.user_id != id);
        Ok(true)
    }

    async fn insert_post(&self, post: &Post) -> Result<(), DatabaseError> {
        self.inner.write().await.posts.push(post.clone());
        Ok(())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.posts.iter().rev().cloned().collect())
    }

    async fn update_post(&self, post: &Post) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        match inner.posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => {
                existing.title = post.title.clone();
                existing.content = post.content.clone();
                existing.updated_at = post.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        let before = inner.posts.len();
        inner.drop_posts_where(|p| p.id == id);
        Ok(inner.posts.len() < before)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), DatabaseError> {
        let mut inner = self.inner.write().await;
        inner.require_parents(comment.user_id, comment.post_id)?;
        inner.comments.push(comment.clone());
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner
            .comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn update_comment(&self, comment: &Comment) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        match inner.comments.iter_mut().find(|c| c.id == comment.id) {
            Some(existing) => {
                existing.content = comment.content.clone();
                existing.updated_at = comment.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        let before = inner.comments.len();
        inner.comments.retain(|c| c.id != id);
        Ok(inner.comments.len() < before)
    }

    async fn add_like(&self, like: &Like) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        inner.require_parents(like.user_id, like.post_id)?;
        if inner
            .likes
            .iter()
            .any(|l| l.user_id == like.user_id && l.post_id == like.post_id)
        {
            return Ok(false);
        }
        inner.likes.push(like.clone());
        Ok(true)
    }

    async fn remove_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        let before = inner.likes.len();
        inner.likes.retain(|l| !(l.user_id == user_id && l.post_id == post_id));
        Ok(inner.likes.len() < before)
    }

    async fn likes_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Like>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner
            .likes
            .iter()
            .filter(|l| post_ids.contains(&l.post_id))
            .cloned()
            .collect())
    }
}
