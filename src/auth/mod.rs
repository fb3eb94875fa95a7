pub mod password;
pub mod policy;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::user::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Role at issue time. Informational only: the middleware reloads the user.
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails with `Generation` when the expiry does not fit in a timestamp
    pub fn new(user_id: Uuid, role: Role, expiry_hours: u64) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| TokenError::Generation(format!("token expiry of {} hours is out of range", expiry_hours)))?;

        Ok(Self {
            sub: user_id,
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid JWT token: {0}")]
    Invalid(String),
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Verify signature and expiry, returning the decoded claims
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}

/// Issue a token for `user_id` with the configured lifetime
pub fn issue_token(user_id: Uuid, role: Role, security: &SecurityConfig) -> Result<String, TokenError> {
    let claims = Claims::new(user_id, role, security.jwt_expiry_hours)?;
    generate_jwt(&claims, security)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, MAX_JWT_EXPIRY_HOURS};

    fn security() -> SecurityConfig {
        AppConfig::development().security
    }

    #[test]
    fn issued_token_round_trips_subject() {
        let security = security();
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, Role::Admin, &security).unwrap();

        let claims = validate_jwt(&token, &security).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let security = security();
        let mut other = security.clone();
        other.jwt_secret = "someone-else".to_string();

        let token = issue_token(Uuid::new_v4(), Role::User, &other).unwrap();
        assert!(matches!(validate_jwt(&token, &security), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let security = security();
        let mut claims = Claims::new(Uuid::new_v4(), Role::User, 1).unwrap();
        // Well past the default 60s leeway
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;

        let token = generate_jwt(&claims, &security).unwrap();
        assert!(matches!(validate_jwt(&token, &security), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn out_of_range_expiry_is_a_generation_error() {
        let mut security = security();

        // Overflows chrono's duration range
        security.jwt_expiry_hours = 10_000_000_000_000_000;
        assert!(matches!(
            issue_token(Uuid::new_v4(), Role::User, &security),
            Err(TokenError::Generation(_))
        ));

        // Does not fit in an i64
        security.jwt_expiry_hours = u64::MAX;
        assert!(matches!(
            issue_token(Uuid::new_v4(), Role::User, &security),
            Err(TokenError::Generation(_))
        ));
    }

    #[test]
    fn longest_configurable_expiry_still_validates() {
        let mut security = security();
        security.jwt_expiry_hours = MAX_JWT_EXPIRY_HOURS;

        let token = issue_token(Uuid::new_v4(), Role::User, &security).unwrap();
        assert!(validate_jwt(&token, &security).is_ok());
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let mut security = security();
        security.jwt_secret.clear();

        assert!(matches!(
            issue_token(Uuid::new_v4(), Role::User, &security),
            Err(TokenError::MissingSecret)
        ));
        assert!(matches!(validate_jwt("abc", &security), Err(TokenError::MissingSecret)));
    }
}
