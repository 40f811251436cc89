use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account role. CUSTOMER is the self-registration default; STAFF and
/// VENDOR are recognized in tokens but grant nothing beyond CUSTOMER yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sqlx(rename = "CUSTOMER")]
    Customer,
    #[sqlx(rename = "ADMIN")]
    Admin,
    #[sqlx(rename = "STAFF")]
    Staff,
    #[sqlx(rename = "VENDOR")]
    Vendor,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Customer => "CUSTOMER",
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::Vendor => "VENDOR",
        };
        write!(f, "{}", s)
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique identifier for the account
    pub id: Uuid,

    /// Email address, stored trimmed and lowercased
    pub email: String,

    /// bcrypt hash of the password, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Account role
    pub role: Role,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,
}
