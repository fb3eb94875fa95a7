use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::AuthorView;
use crate::auth::policy::Resource;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(content: String, user_id: Uuid, post_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content,
            user_id,
            post_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Resource for Comment {
    const KIND: &'static str = "comment";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub user: Option<AuthorView>,
    pub post: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(comment: Comment, user: Option<AuthorView>) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            user,
            post: comment.post_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}
