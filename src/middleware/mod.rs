pub mod auth;
pub mod response;

pub use auth::{authenticate, jwt_auth_middleware, require_admin, CurrentUser};
pub use response::{ApiJson, ApiResponse, ApiResult};
