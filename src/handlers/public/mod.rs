// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, account creation and service status.

pub mod auth;
pub mod system;
pub mod users;
