pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod gate;
pub mod handlers;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod notice;
pub mod state;
pub mod store;
pub mod validation;

use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::middleware::{require_admin, require_employer, require_student, resolve_principal};
use crate::state::AppState;

/// Full application router. Every route sees the resolved principal; the
/// role-gated groups additionally require a matching role.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Role-gated API
        .merge(admin_routes())
        .merge(employer_routes())
        .merge(student_routes())
        // Global middleware
        .layer(from_fn_with_state(state.clone(), resolve_principal))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::protected::session;
    use handlers::public::{auth, jobs, locations, pages};

    Router::new()
        // Sign-up and sign-in
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        // Page gate and session chrome
        .route("/app/:page", get(pages::page_get))
        .route("/api/session", get(session::session_get))
        .route("/api/auth/logout", post(session::logout_post))
        // Job board
        .route("/api/jobs", get(jobs::jobs_get))
        .route("/api/locations/suggest", get(locations::suggest_get))
}

fn admin_routes() -> Router<AppState> {
    use axum::routing::delete;
    use handlers::protected::admin;

    Router::new()
        .route("/api/admin/jobs/pending", get(admin::pending_get))
        .route("/api/admin/jobs/:id/approve", post(admin::approve_post))
        .route("/api/admin/jobs/:id", delete(admin::job_delete))
        .route_layer(from_fn(require_admin))
}

fn employer_routes() -> Router<AppState> {
    use axum::routing::patch;
    use handlers::protected::employer;

    Router::new()
        .route("/api/employer/jobs", get(employer::jobs_get).post(employer::job_post))
        .route(
            "/api/employer/jobs/:id",
            get(employer::job_get).put(employer::job_put).delete(employer::job_delete),
        )
        .route("/api/employer/applications", get(employer::applications_get))
        .route("/api/employer/applications/:id", patch(employer::application_patch))
        .route("/api/employer/students/:id/resume", get(employer::resume_get))
        .route_layer(from_fn(require_employer))
}

fn student_routes() -> Router<AppState> {
    use axum::routing::put;
    use handlers::protected::{apply, profile};

    Router::new()
        .route("/api/jobs/:id/apply", post(apply::apply_post))
        .route("/api/profile", get(profile::profile_get).patch(profile::profile_patch))
        .route("/api/profile/skills", put(profile::skills_put))
        .route("/api/profile/photo", put(profile::photo_put))
        .route("/api/profile/resume", put(profile::resume_put))
        .route("/api/profile/:section", post(profile::entry_post))
        .route(
            "/api/profile/:section/:id",
            put(profile::entry_put).delete(profile::entry_delete),
        )
        .route_layer(from_fn(require_student))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let methods = [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE];
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(methods).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    CorsLayer::new().allow_origin(origins).allow_methods(methods).allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "CareerBridge API",
            "version": version,
            "description": "Job board: employers post jobs, admins approve them, students apply",
            "endpoints": {
                "auth": "/auth/register, /auth/login (public)",
                "pages": "/app/:page (gate: redirect or page context)",
                "jobs": "/api/jobs, /api/locations/suggest (public)",
                "session": "/api/session, /api/auth/logout",
                "admin": "/api/admin/jobs/* (admin)",
                "employer": "/api/employer/* (employer)",
                "student": "/api/jobs/:id/apply, /api/profile/* (student)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                    }
                })),
            )
        }
    }
}
