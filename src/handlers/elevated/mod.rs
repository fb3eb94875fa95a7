// handlers/elevated/mod.rs - Elevated handlers (admin or superAdmin role)
//
// Routed behind `jwt_auth_middleware` followed by `require_admin`.

pub mod users;
