use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{migrate::Migrator, FromRow, PgPool};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{Comment, Like, Post, Role, User};
use super::store::Store;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Postgres-backed store. One table per collection; the unique
/// `(user_id, post_id)` constraint on `likes` enforces single membership.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(DatabaseError::QueryError)?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// A parent row deleted between the service's existence check and the insert
fn missing_parent(err: &sqlx::Error) -> Option<DatabaseError> {
    match err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            let message = match db.constraint() {
                Some(name) if name.contains("post_id") => "Post not found",
                _ => "User not found",
            };
            Some(DatabaseError::NotFound(message))
        }
        _ => None,
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(DatabaseError::Duplicate("User already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS))
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_post(&self, post: &Post) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO posts (id, title, content, author_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, DatabaseError> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, title, content, author_id, created_at, updated_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DatabaseError> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, title, content, author_id, created_at, updated_at FROM posts
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn update_post(&self, post: &Post) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE posts SET title = $2, content = $3, updated_at = $4 WHERE id = $1")
            .bind(post.id)
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO comments (id, content, user_id, post_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(comment.id)
        .bind(&comment.content)
        .bind(comment.user_id)
        .bind(comment.post_id)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_parent(&e).unwrap_or(DatabaseError::Sqlx(e)))?;
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, DatabaseError> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, content, user_id, post_id, created_at, updated_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DatabaseError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, content, user_id, post_id, created_at, updated_at FROM comments
             WHERE post_id = $1
             ORDER BY created_at DESC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn update_comment(&self, comment: &Comment) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE comments SET content = $2, updated_at = $3 WHERE id = $1")
            .bind(comment.id)
            .bind(&comment.content)
            .bind(comment.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_like(&self, like: &Like) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO likes (id, user_id, post_id, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, post_id) DO NOTHING",
        )
        .bind(like.id)
        .bind(like.user_id)
        .bind(like.post_id)
        .bind(like.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_parent(&e).unwrap_or(DatabaseError::Sqlx(e)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn likes_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Like>, DatabaseError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let likes = sqlx::query_as::<_, Like>(
            "SELECT id, user_id, post_id, created_at FROM likes
             WHERE post_id = ANY($1)
             ORDER BY created_at ASC",
        )
        .bind(post_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }
}

/// Run against a real database when `DATABASE_URL` is set; skipped otherwise.
/// Every test uses fresh ids and emails so a shared database is fine.
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sqlx::postgres::PgPoolOptions;

    async fn store() -> Option<PgStore> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping PgStore test");
            return None;
        };

        let pool = PgPoolOptions::new().max_connections(5).connect(&url).await.unwrap();
        let store = PgStore::new(pool);
        store.migrate().await.unwrap();
        Some(store)
    }

    async fn user(store: &PgStore, role: Role) -> User {
        let user = User::new(
            "Test".into(),
            format!("{}@example.com", Uuid::new_v4()),
            "hash".into(),
            role,
        );
        store.insert_user(&user).await.unwrap();
        user
    }

    async fn post(store: &PgStore, author: &User) -> Post {
        let post = Post::new("t".into(), "c".into(), author.id);
        store.insert_post(&post).await.unwrap();
        post
    }

    #[tokio::test]
    async fn duplicate_email_is_reported() {
        let Some(store) = store().await else { return };
        let existing = user(&store, Role::User).await;

        let twin = User::new("Twin".into(), existing.email.clone(), "hash".into(), Role::User);
        let err = store.insert_user(&twin).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate(_)));
    }

    #[tokio::test]
    async fn roles_and_batch_lookup_round_trip() {
        let Some(store) = store().await else { return };
        let admin = user(&store, Role::SuperAdmin).await;
        let plain = user(&store, Role::User).await;

        let found = store.find_user_by_email(&admin.email).await.unwrap().unwrap();
        assert_eq!(found.role, Role::SuperAdmin);

        let mut ids: Vec<Uuid> = store
            .find_users(&[admin.id, plain.id, Uuid::new_v4()])
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        ids.sort();
        let mut expected = vec![admin.id, plain.id];
        expected.sort();
        assert_eq!(ids, expected);
        assert!(store.find_users(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let Some(store) = store().await else { return };
        let author = user(&store, Role::User).await;

        let mut older = Post::new("older".into(), "x".into(), author.id);
        older.created_at = Utc::now() - Duration::minutes(1);
        store.insert_post(&older).await.unwrap();
        let newer = post(&store, &author).await;

        let ours: Vec<Uuid> = store
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .filter(|id| *id == older.id || *id == newer.id)
            .collect();
        assert_eq!(ours, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn like_is_insert_if_absent() {
        let Some(store) = store().await else { return };
        let fan = user(&store, Role::User).await;
        let post = post(&store, &fan).await;

        assert!(store.add_like(&Like::new(fan.id, post.id)).await.unwrap());
        assert!(!store.add_like(&Like::new(fan.id, post.id)).await.unwrap());
        assert_eq!(store.likes_for_posts(&[post.id]).await.unwrap().len(), 1);

        assert!(store.remove_like(fan.id, post.id).await.unwrap());
        assert!(!store.remove_like(fan.id, post.id).await.unwrap());
    }

    #[tokio::test]
    async fn deletes_cascade() {
        let Some(store) = store().await else { return };
        let author = user(&store, Role::User).await;
        let reader = user(&store, Role::User).await;

        let doomed = post(&store, &author).await;
        store.insert_comment(&Comment::new("nice".into(), reader.id, doomed.id)).await.unwrap();
        store.add_like(&Like::new(reader.id, doomed.id)).await.unwrap();

        assert!(store.delete_user(author.id).await.unwrap());
        assert!(store.find_post(doomed.id).await.unwrap().is_none());
        assert!(store.comments_for_post(doomed.id).await.unwrap().is_empty());
        assert!(store.likes_for_posts(&[doomed.id]).await.unwrap().is_empty());

        let kept = post(&store, &reader).await;
        store.insert_comment(&Comment::new("mine".into(), reader.id, kept.id)).await.unwrap();
        assert!(store.delete_post(kept.id).await.unwrap());
        assert!(store.comments_for_post(kept.id).await.unwrap().is_empty());
        assert!(store.find_user(reader.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn writes_against_deleted_post_are_not_found() {
        let Some(store) = store().await else { return };
        let reader = user(&store, Role::User).await;
        let gone = post(&store, &reader).await;
        store.delete_post(gone.id).await.unwrap();

        let err = store
            .insert_comment(&Comment::new("late".into(), reader.id, gone.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound("Post not found")));

        let err = store.add_like(&Like::new(reader.id, gone.id)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound("Post not found")));
    }
}
