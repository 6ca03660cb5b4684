// handlers/protected/session.rs - GET /api/session, POST /api/auth/logout

use axum::Extension;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::gate::Chrome;
use crate::middleware::{ApiResponse, ApiResult, CurrentPrincipal};
use crate::models::Role;

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub home: &'static str,
    pub demo: bool,
    pub chrome: Chrome,
}

#[derive(Debug, Serialize)]
pub struct LogoutResult {
    pub redirect: &'static str,
}

/// GET /api/session - the signed-in principal and its page chrome
pub async fn session_get(Extension(current): Extension<CurrentPrincipal>) -> ApiResult<SessionInfo> {
    let principal = current.0.ok_or_else(|| ApiError::unauthorized("Please sign in to continue."))?;

    Ok(ApiResponse::success(SessionInfo {
        id: principal.id(),
        email: principal.user.email.clone(),
        role: principal.role(),
        home: principal.role().home_page(),
        demo: principal.is_demo(),
        chrome: principal.chrome(),
    }))
}

/// POST /api/auth/logout - tokens are stateless, so this only names the next page
pub async fn logout_post(Extension(current): Extension<CurrentPrincipal>) -> ApiResult<LogoutResult> {
    if let Some(principal) = current.0.as_ref() {
        tracing::info!("Signed out {}", principal.id());
    }
    Ok(ApiResponse::success(LogoutResult { redirect: "index.html" }).saying("Signed out successfully."))
}
