use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A user liking a post. At most one per (user, post); the set of likes on
/// a post is derived from these records.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(user_id: Uuid, post_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            created_at: Utc::now(),
        }
    }
}
