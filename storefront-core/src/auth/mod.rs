//! JWT authentication: token mint/verify, password hashing, and the
//! identity handlers see on the request.

pub mod handlers;
pub mod middleware;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::{Role, User};

/// Back-office identity served when the database is unreachable.
/// Only honored while demo login is enabled in the config.
pub const DEMO_EMAIL: &str = "admin@target.com";
pub const DEMO_PASSWORD: &str = "admin123";
pub const DEMO_USER_ID: &str = "demo-admin";

const TOKEN_TTL_DAYS: i64 = 7;
const HASH_COST: u32 = 10;

/// Claims carried inside every access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string; `demo-admin` for the demo identity.
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// A malformed stored hash counts as a failed check, not an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn sign_token(
    sub: &str,
    email: &str,
    role: Role,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: sub.to_string(),
        email: email.to_string(),
        role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .ok()
}

/// The authenticated identity attached to request extensions. `id` stays
/// a string so the demo identity fits alongside UUID-keyed users.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl AuthUser {
    pub fn demo_admin() -> Self {
        AuthUser {
            id: DEMO_USER_ID.to_string(),
            email: DEMO_EMAIL.to_string(),
            name: Some("Admin".to_string()),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        AuthUser {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip_preserves_claims() {
        let token = sign_token("demo-admin", DEMO_EMAIL, Role::Admin, "secret").unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "demo-admin");
        assert_eq!(claims.email, DEMO_EMAIL);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = sign_token("demo-admin", DEMO_EMAIL, Role::Admin, "secret").unwrap();
        assert!(verify_token(&token, "other-secret").is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: "demo-admin".to_string(),
            email: DEMO_EMAIL.to_string(),
            role: Role::Admin,
            iat: (now - Duration::days(8)).timestamp() as usize,
            exp: (now - Duration::days(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(verify_token(&token, "secret").is_none());
    }

    #[test]
    fn test_password_hashing_round_trip() {
        let hash = hash_password("admin123").unwrap();
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
        assert!(!verify_password("admin123", "not-a-bcrypt-hash"));
    }
}
