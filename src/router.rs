use axum::{
    extract::{DefaultBodyLimit, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin};
use crate::state::AppState;

/// Full application router with state applied
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security, state.config.is_development());
    let body_limit = DefaultBodyLimit::max(state.config.api.max_request_size_bytes);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected (JWT)
        .merge(protected_routes(state.clone()))
        // Elevated (JWT + admin role)
        .merge(elevated_routes(state.clone()))
        .fallback(not_found)
        // Also replaces the per-path 405 fallbacks that route_layer wrapped in auth
        .method_not_allowed_fallback(method_not_allowed)
        // Global middleware
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        // Token acquisition
        .route("/api/auth/register", post(public::auth::register))
        .route("/api/auth/login", post(public::auth::login))
        .route("/api/users/register", post(public::auth::register))
        .route("/api/users/login", post(public::auth::login))
        // Read-only resources
        .route("/api/users/:id", get(public::users::show))
        .route("/api/posts", get(public::posts::list))
        .route("/api/posts/:id", get(public::posts::show))
        .route("/api/comments/:id", get(public::comments::list_for_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users/me", get(protected::users::me))
        // Posts
        .route("/api/posts", post(protected::posts::create))
        .route(
            "/api/posts/:id",
            put(protected::posts::update).delete(protected::posts::delete),
        )
        .route("/api/posts/:id/like", post(protected::posts::like))
        .route("/api/posts/:id/unlike", delete(protected::posts::unlike))
        // Comments: POST takes the parent post id, PUT/DELETE the comment id
        .route(
            "/api/comments/:id",
            post(protected::comments::create)
                .put(protected::comments::update)
                .delete(protected::comments::delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    // Layers run bottom-up: authenticate, then check the role
    Router::new()
        .route("/api/users/:id", delete(elevated::users::delete))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig, development: bool) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Blog API (Rust)",
        "version": version,
        "endpoints": {
            "auth": "POST /api/auth/register, POST /api/auth/login, POST /api/users/register, POST /api/users/login",
            "users": "GET /api/users/me (auth), GET /api/users/:id, DELETE /api/users/:id (admin)",
            "posts": "GET|POST /api/posts, GET|PUT|DELETE /api/posts/:id, POST /api/posts/:id/like, DELETE /api/posts/:id/unlike",
            "comments": "GET|POST /api/comments/:postId, PUT|DELETE /api/comments/:id",
            "health": "GET /health",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "error": "database unavailable"
                })),
            )
        }
    }
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed", "code": "METHOD_NOT_ALLOWED" })),
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found", "code": "NOT_FOUND" })))
}
