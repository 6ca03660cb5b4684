// handlers/public/auth.rs - POST /auth/register, POST /auth/login

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Role, User};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub display_name: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionGrant {
    pub token: String,
    pub user: User,
    pub redirect: &'static str,
}

/// POST /auth/register - create a student or employer account and sign in
pub async fn register_post(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<SessionGrant> {
    if body.role == Role::Admin {
        return Err(ApiError::forbidden("Admin accounts cannot be self-registered."));
    }

    let email = body.email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::validation_error("Please enter a valid email address.", Some("email")));
    }
    if body.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation_error(
            format!("Password must be at least {} characters long.", MIN_PASSWORD_LEN),
            Some("password"),
        ));
    }
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("An account with this email already exists."));
    }

    let mut user = User::new(email, body.role);
    user.display_name = body.display_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    user.company_name = body.company_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    user.password_hash = Some(hash_password(&body.password));
    state.store.insert_user(&user).await?;

    tracing::info!("Registered {} {}", user.role, user.id);
    let token = issue_token(&state, &user)?;
    Ok(ApiResponse::created(SessionGrant {
        token,
        redirect: user.role.home_page(),
        user,
    })
    .saying("Account created successfully!"))
}

/// POST /auth/login - exchange email and password for a token
pub async fn login_post(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> ApiResult<SessionGrant> {
    let user = state.store.find_user_by_email(body.email.trim()).await?;

    let user = match user {
        Some(u) if u.password_hash.as_deref().is_some_and(|h| verify_password(&body.password, h)) => u,
        _ => {
            tracing::warn!("Failed sign-in for {}", body.email.trim());
            return Err(ApiError::unauthorized("Invalid email or password."));
        }
    };

    let token = issue_token(&state, &user)?;
    Ok(ApiResponse::success(SessionGrant {
        token,
        redirect: user.role.home_page(),
        user,
    })
    .saying("Signed in successfully!"))
}

fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    let claims = Claims::new(user, state.config.security.jwt_expiry_hours);
    generate_jwt(&state.config.security, &claims).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Unable to sign in right now.")
    })
}
