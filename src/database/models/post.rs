use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::AuthorView;
use crate::auth::policy::Resource;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(title: String, content: String, author_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Resource for Post {
    const KIND: &'static str = "post";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Option<Uuid> {
        Some(self.author_id)
    }
}

/// Post as returned by the API: author populated, likes derived from the
/// like records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Option<AuthorView>,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    pub fn new(post: Post, author: Option<AuthorView>, likes: Vec<Uuid>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author,
            likes,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
