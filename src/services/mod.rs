pub mod comment_service;
pub mod post_service;
pub mod user_service;

pub use comment_service::{CommentService, CreateComment, UpdateComment};
pub use post_service::{CreatePost, PostService, UpdatePost};
pub use user_service::{LoginRequest, LoginResponse, RegisterRequest, UserService};

use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::AuthorView;
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;

/// Populate user references: id -> `{id, name, email}` for every id that
/// still resolves to a user.
pub(crate) async fn populate_users(
    store: &dyn Store,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, AuthorView>, DatabaseError> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let users = store.find_users(&ids).await?;
    Ok(users.iter().map(|u| (u.id, AuthorView::from(u))).collect())
}

/// Path ids that are not UUIDs cannot name an existing document.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}

/// Trimmed value if present and non-blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// For partial updates: absent is fine, present-but-blank is not.
pub(crate) fn optional_field(value: Option<&str>, field: &str) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => non_blank(Some(raw))
            .map(Some)
            .ok_or_else(|| blank_field(field)),
    }
}

pub(crate) fn blank_field(field: &str) -> ApiError {
    let mut field_errors = HashMap::new();
    field_errors.insert(field.to_string(), "This field cannot be empty".to_string());
    ApiError::validation_error(format!("{} cannot be empty", capitalize(field)), Some(field_errors))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::auth::password::hash_password;
    use crate::database::models::{Role, User, UserView};
    use crate::database::{MemoryStore, Store};

    pub fn store() -> Arc<dyn Store> {
        Arc::new(MemoryStore::new())
    }

    pub async fn seed_user(store: &Arc<dyn Store>, name: &str, role: Role) -> UserView {
        let user = User::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            hash_password("password123").unwrap(),
            role,
        );
        store.insert_user(&user).await.unwrap();
        user.view()
    }
}
