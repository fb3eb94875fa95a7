// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler here receives the caller as `Extension<CurrentUser>`, injected
// by `jwt_auth_middleware`. Owner-or-admin checks happen in the services.

pub mod comments;
pub mod posts;
pub mod users;
