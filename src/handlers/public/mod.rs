// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus every read-only view of posts, comments and
// user profiles.

pub mod auth;
pub mod comments;
pub mod posts;
pub mod users;
