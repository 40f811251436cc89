use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{
    hash_password, sign_token, verify_password, AuthUser, DEMO_EMAIL, DEMO_PASSWORD,
};
use crate::error::{ApiError, ApiResult};
use crate::models::user::{Role, User};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: AuthUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AuthUser,
}

fn credentials(email: Option<String>, password: Option<String>) -> ApiResult<(String, String)> {
    let email = email.map(|e| e.trim().to_lowercase()).unwrap_or_default();
    let password = password.unwrap_or_default();
    if email.is_empty() || password.trim().is_empty() {
        return Err(ApiError::bad_request("Email and password required"));
    }
    Ok((email, password))
}

fn token_response(state: &AppState, user: AuthUser) -> ApiResult<Json<AuthResponse>> {
    let token = sign_token(&user.id, &user.email, user.role, &state.config.jwt_secret)
        .map_err(|e| ApiError::internal("sign token", e))?;
    Ok(Json(AuthResponse { user, token }))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    body: Option<Json<RegisterRequest>>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(body) = body.unwrap_or_default();
    let (email, password) = credentials(body.email, body.password)?;

    if state.stores.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash =
        hash_password(&password).map_err(|e| ApiError::internal("hash password", e))?;
    let user = User {
        id: Uuid::new_v4(),
        email,
        password_hash,
        name: body
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        role: Role::Customer,
        created_at: Utc::now(),
    };
    state.stores.users.create(user.clone()).await?;

    let response = token_response(&state, AuthUser::from(&user))?;
    Ok((StatusCode::CREATED, response))
}

fn demo_credentials_match(state: &AppState, email: &str, password: &str) -> bool {
    state.config.demo_login_enabled && email == DEMO_EMAIL && password == DEMO_PASSWORD
}

/// POST /api/auth/login
///
/// When the database is down the demo identity still gets in (if enabled),
/// so the back-office stays reachable during an outage.
pub async fn login(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(body) = body.unwrap_or_default();
    let (email, password) = credentials(body.email, body.password)?;

    match state.stores.users.find_by_email(&email).await {
        Ok(Some(user)) if verify_password(&password, &user.password_hash) => {
            return token_response(&state, AuthUser::from(&user));
        }
        Ok(_) => {}
        Err(err) => {
            if demo_credentials_match(&state, &email, &password) {
                return token_response(&state, AuthUser::demo_admin());
            }
            if err.is_unavailable() {
                let message = if state.config.demo_login_enabled {
                    "Database unavailable. Use demo: admin@target.com / admin123"
                } else {
                    "Database unavailable"
                };
                return Err(ApiError::Unavailable(message.to_string()));
            }
            return Err(ApiError::internal("login lookup", err));
        }
    }

    if demo_credentials_match(&state, &email, &password) {
        return token_response(&state, AuthUser::demo_admin());
    }
    Err(ApiError::Unauthorized("Invalid email or password".to_string()))
}

/// POST /api/auth/logout. Tokens are stateless, so there is nothing to
/// revoke server-side; the client drops its copy.
pub async fn logout() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<AuthUser>) -> Json<MeResponse> {
    Json(MeResponse { user })
}
