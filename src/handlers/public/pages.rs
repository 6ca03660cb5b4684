// handlers/public/pages.rs - GET /app/:page

use axum::{
    extract::Path,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::gate::{self, GateDecision};
use crate::middleware::{ApiResponse, CurrentPrincipal};

/// GET /app/:page - 303 to the login/home page, or the page context
pub async fn page_get(Path(page): Path<String>, Extension(current): Extension<CurrentPrincipal>) -> Response {
    let page = gate::page_from_path(&page);
    match gate::decide(page, current.0.as_ref()) {
        GateDecision::Redirect(to) => {
            tracing::debug!("Gate redirected {} to {}", page, to);
            Redirect::to(to).into_response()
        }
        GateDecision::Allow(context) => ApiResponse::success(context).into_response(),
    }
}
