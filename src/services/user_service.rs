use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::{non_blank, parse_id};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::policy::{authorize, Action};
use crate::auth::issue_token;
use crate::config::AppConfig;
use crate::database::models::{Role, User, UserView};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;

const USER_NOT_FOUND: &str = "User not found";
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(alias = "name")]
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

pub struct UserService {
    store: Arc<dyn Store>,
    config: Arc<AppConfig>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Self-service registration. Always creates a plain `user`.
    pub async fn register(&self, input: RegisterRequest) -> Result<UserView, ApiError> {
        let name = non_blank(input.username.as_deref());
        let email = non_blank(input.email.as_deref()).map(|e| normalize_email(&e));
        // Passwords are taken verbatim, whitespace included
        let password = input.password.filter(|p| !p.is_empty());

        let (name, email, password) = match (name, email, password) {
            (Some(name), Some(email), Some(password)) => (name, email, password),
            (name, email, password) => {
                let mut field_errors = HashMap::new();
                for (field, missing) in [
                    ("username", name.is_none()),
                    ("email", email.is_none()),
                    ("password", password.is_none()),
                ] {
                    if missing {
                        field_errors.insert(field.to_string(), "This field is required".to_string());
                    }
                }
                return Err(ApiError::validation_error("All fields are required", Some(field_errors)));
            }
        };

        if !looks_like_email(&email) {
            return Err(ApiError::validation_error("Invalid email", None));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation_error(
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
                None,
            ));
        }

        let user = self.create_user(name, email, &password, Role::User).await?;
        tracing::info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Insert a user with any role; used by registration, the CLI and the
    /// startup admin bootstrap.
    pub async fn create_user(&self, name: String, email: String, password: &str, role: Role) -> Result<UserView, ApiError> {
        let email = normalize_email(&email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ApiError::conflict("User already exists"));
        }

        let user = User::new(name, email, hash_password(password)?, role);
        self.store.insert_user(&user).await.map_err(|e| match e {
            DatabaseError::Duplicate(_) => ApiError::conflict("User already exists"),
            other => other.into(),
        })?;
        Ok(user.view())
    }

    /// Create the admin account unless a user with that email exists
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str) -> Result<bool, ApiError> {
        if self.store.find_user_by_email(&normalize_email(email)).await?.is_some() {
            return Ok(false);
        }
        let admin = self
            .create_user(name.to_string(), email.to_string(), password, Role::Admin)
            .await?;
        tracing::info!("Bootstrapped admin user {} ({})", admin.id, admin.email);
        Ok(true)
    }

    pub async fn login(&self, input: LoginRequest) -> Result<LoginResponse, ApiError> {
        let (email, password) = match (non_blank(input.email.as_deref()), input.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => (normalize_email(&email), password),
            _ => return Err(ApiError::validation_error("Email and password are required", None)),
        };

        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) if verify_password(&password, &user.password_hash) => user,
            _ => {
                tracing::warn!("Failed login attempt for {}", email);
                return Err(ApiError::unauthorized("Invalid credentials"));
            }
        };

        let token = issue_token(user.id, user.role, &self.config.security)?;
        tracing::debug!("User {} logged in", user.id);

        Ok(LoginResponse {
            token,
            user: user.view(),
        })
    }

    pub async fn get(&self, id: &str) -> Result<UserView, ApiError> {
        Ok(self.load(id).await?.view())
    }

    /// Admin-only account removal; cascades to the user's content
    pub async fn delete(&self, actor: &UserView, id: &str) -> Result<(), ApiError> {
        let user = self.load(id).await?;
        authorize(actor, Action::Delete, &user)?;

        if !self.store.delete_user(user.id).await? {
            return Err(ApiError::not_found(USER_NOT_FOUND));
        }
        tracing::info!("User {} deleted user {}", actor.id, user.id);
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<User, ApiError> {
        let id = parse_id(id, USER_NOT_FOUND)?;
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// One `@` with something on each side and a dot in the domain
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
