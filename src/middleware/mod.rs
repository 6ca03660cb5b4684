pub mod auth;
pub mod response;

pub use auth::{require_admin, require_employer, require_student, resolve_principal, CurrentPrincipal};
pub use response::{ApiResponse, ApiResult};
