// handlers/mod.rs - 3-tier handler architecture
//
// Public (no auth) → Protected (JWT auth) → Elevated (JWT auth + admin role)
//
// Handlers only extract input, call a service and wrap the result in the
// response envelope. Authorization decisions live in the services.
pub mod public;    // Tier 1: registration, login, read-only resources
pub mod protected; // Tier 2: mutations by the authenticated caller
pub mod elevated;  // Tier 3: admin-only operations
