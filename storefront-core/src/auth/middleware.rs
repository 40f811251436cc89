use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::{verify_token, AuthUser, DEMO_USER_ID};
use crate::error::ApiError;
use crate::AppState;

fn bearer_token(req: &Request) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION);
    match header.and_then(|v| v.to_str().ok()) {
        Some(s) if s.starts_with("Bearer ") => Some(&s[7..]),
        _ => None,
    }
}

/// Turns a verified token into the identity it names. The demo subject
/// never touches the database; anyone else must still exist there.
async fn resolve_token(state: &AppState, token: &str) -> Option<AuthUser> {
    let claims = verify_token(token, &state.config.jwt_secret)?;
    if claims.sub == DEMO_USER_ID {
        if state.config.demo_login_enabled {
            return Some(AuthUser::demo_admin());
        }
        return None;
    }
    let id = Uuid::parse_str(&claims.sub).ok()?;
    match state.stores.users.find_by_id(id).await {
        Ok(Some(user)) => Some(AuthUser::from(&user)),
        _ => None,
    }
}

/// Attaches an identity when a valid token is present, stays anonymous
/// otherwise. Checkout uses this to link orders to logged-in customers.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(&req) {
        if let Some(user) = resolve_token(&state, token).await {
            req.extensions_mut().insert(user);
        }
    }
    next.run(req).await
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)
        .ok_or_else(|| ApiError::Unauthorized("Token required".to_string()))?;
    let user = resolve_token(&state, token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)
        .ok_or_else(|| ApiError::Unauthorized("Token required".to_string()))?;
    let user = resolve_token(&state, token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
    if !user.is_admin() {
        return Err(ApiError::Forbidden("Admin only".to_string()));
    }
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
