use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::policy::require_role;
use crate::auth::{validate_jwt, TokenError};
use crate::database::models::{Role, UserView};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user resolved from the bearer token, password excluded
#[derive(Clone, Debug)]
pub struct CurrentUser(pub UserView);

/// JWT authentication middleware: verifies the token, reloads the user and
/// injects it into the request extensions
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &headers).await?;

    tracing::debug!("Authenticated user {} ({})", user.id, user.role);
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Role gate for admin-only routes. Must run after `jwt_auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let CurrentUser(user) = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Access token required"))?;

    if let Err(err) = require_role(user, &Role::ELEVATED) {
        tracing::warn!("User {} ({}) denied admin route {}", user.id, user.role, request.uri().path());
        return Err(err);
    }

    Ok(next.run(request).await)
}

/// Resolve the caller from the `Authorization` header
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserView, ApiError> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| ApiError::unauthorized("Access token required"))?;

    let claims = validate_jwt(token, &state.config.security).map_err(ApiError::from)?;

    match state.store.find_user(claims.sub).await? {
        Some(user) => Ok(user.view()),
        None => {
            tracing::warn!("Token subject {} no longer exists", claims.sub);
            Err(TokenError::Invalid("unknown subject".to_string()).into())
        }
    }
}

/// Token part of `Authorization: Bearer <token>`, if well formed
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = auth_str.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_tokens() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(extract_bearer_token(&headers("Bearer ")), None);
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcg==")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
