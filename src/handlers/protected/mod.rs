// handlers/protected/mod.rs - Role-gated handlers
//
// Each group is mounted behind the matching require_* middleware, which
// injects the resolved `Principal` as a request extension.

pub mod admin;
pub mod apply;
pub mod employer;
pub mod profile;
pub mod session;
