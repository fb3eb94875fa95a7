use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Comment, Like, Post, User};

/// Document store holding users, posts, comments and likes.
///
/// Listing operations return newest first. Deletes cascade: a user takes
/// their posts, comments and likes with them; a post takes its comments and
/// likes.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip to prove the backend is reachable
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Users

    /// Fails with `Duplicate` when the email is taken
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    /// Batch lookup backing reference population; missing ids are skipped
    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError>;
    async fn delete_user(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Posts

    async fn insert_post(&self, post: &Post) -> Result<(), DatabaseError>;
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DatabaseError>;
    async fn list_posts(&self) -> Result<Vec<Post>, DatabaseError>;
    /// Replaces title, content and updated_at. `false` if the post is gone.
    async fn update_post(&self, post: &Post) -> Result<bool, DatabaseError>;
    async fn delete_post(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Comments

    /// Fails with `NotFound` if the post or author is gone by the time of the write
    async fn insert_comment(&self, comment: &Comment) -> Result<(), DatabaseError>;
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, DatabaseError>;
    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DatabaseError>;
    async fn update_comment(&self, comment: &Comment) -> Result<bool, DatabaseError>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Likes

    /// Insert-if-absent. `false` when the user already likes the post;
    /// `NotFound` if the post or user no longer exists.
    async fn add_like(&self, like: &Like) -> Result<bool, DatabaseError>;
    /// `false` when there was no like to remove
    async fn remove_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, DatabaseError>;
    /// Likes on the given posts, oldest first
    async fn likes_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Like>, DatabaseError>;
}
