// handlers/protected/mod.rs - Protected handlers (bearer access token required)
//
// Every handler here receives the caller as an `AuthUser` inserted by the auth gate and
// applies the ownership policy before touching a record.

pub mod items;
pub mod locations;
pub mod users;
