use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::auth::validate_jwt;
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::gate::{self, Credentials, Principal, DEMO_PRINCIPAL_HEADER};
use crate::models::Role;
use crate::state::AppState;

/// Principal resolved for the current request, if any
#[derive(Clone, Debug)]
pub struct CurrentPrincipal(pub Option<Principal>);

/// Resolves the caller on every request and injects `CurrentPrincipal`.
///
/// A bad token is not an error here; the caller is simply anonymous and the
/// route decides whether that is acceptable.
pub async fn resolve_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = extract_credentials(request.headers(), &state.config.security);

    let principal = gate::resolve(state.store.as_ref(), credentials).await.map_err(|e| {
        tracing::error!("Failed to resolve principal: {}", e);
        ApiError::service_unavailable("Unable to verify your session right now. Please try again.")
    })?;

    request.extensions_mut().insert(CurrentPrincipal(principal));
    Ok(next.run(request).await)
}

/// Bearer token first, then the demo header when it is enabled
fn extract_credentials(headers: &HeaderMap, security: &SecurityConfig) -> Credentials {
    match extract_jwt_from_headers(headers) {
        Ok(Some(token)) => match validate_jwt(security, &token) {
            Ok(claims) => return Credentials::Token(claims.sub),
            Err(e) => tracing::warn!("Ignoring bearer token: {}", e),
        },
        Ok(None) => {}
        Err(msg) => tracing::warn!("Ignoring Authorization header: {}", msg),
    }

    if security.allow_demo_principal {
        if let Some(raw) = headers.get(DEMO_PRINCIPAL_HEADER).and_then(|v| v.to_str().ok()) {
            match Uuid::parse_str(raw.trim()) {
                Ok(id) => return Credentials::Demo(id),
                Err(_) => tracing::warn!("Ignoring malformed demo principal '{}'", raw),
            }
        }
    }

    Credentials::Anonymous
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(Some(token.trim().to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

async fn require_roles(roles: &[Role], mut request: Request, next: Next) -> Response {
    let current = request.extensions().get::<CurrentPrincipal>().and_then(|c| c.0.clone());

    let principal = match current {
        None => return ApiError::unauthorized("Please sign in to continue.").into_response(),
        Some(p) if !roles.contains(&p.role()) => {
            tracing::warn!("{} {} denied {}", p.role(), p.id(), request.uri().path());
            return ApiError::forbidden("You do not have access to this resource.").into_response();
        }
        Some(p) => p,
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

pub async fn require_admin(request: Request, next: Next) -> Response {
    require_roles(&[Role::Admin], request, next).await
}

pub async fn require_employer(request: Request, next: Next) -> Response {
    require_roles(&[Role::Employer], request, next).await
}

pub async fn require_student(request: Request, next: Next) -> Response {
    require_roles(&[Role::Student], request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt, Claims};
    use crate::config::AppConfig;
    use crate::models::User;
    use axum::http::HeaderValue;

    #[test]
    fn token_beats_demo_header() {
        let config = AppConfig::development();
        let user = User::new("a@b.com", Role::Student);
        let token = generate_jwt(&config.security, &Claims::new(&user, 1)).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(&format!("Bearer {}", token)).unwrap());
        headers.insert(DEMO_PRINCIPAL_HEADER, HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap());
        assert_eq!(extract_credentials(&headers, &config.security), Credentials::Token(user.id));
    }

    #[test]
    fn demo_header_needs_flag() {
        let mut config = AppConfig::development();
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(DEMO_PRINCIPAL_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(extract_credentials(&headers, &config.security), Credentials::Demo(id));

        config.security.allow_demo_principal = false;
        assert_eq!(extract_credentials(&headers, &config.security), Credentials::Anonymous);
    }

    #[test]
    fn bad_token_is_anonymous() {
        let config = AppConfig::development();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer not.a.token"));
        assert_eq!(extract_credentials(&headers, &config.security), Credentials::Anonymous);
    }
}
