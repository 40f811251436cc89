use std::env;

/// Runtime configuration, read once at startup. The binary loads `.env`
/// through dotenv before calling `from_env`.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Permits the fixed demo admin credentials when the database cannot
    /// answer a login. Off unless DEMO_LOGIN_ENABLED is set.
    pub demo_login_enabled: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()),
            demo_login_enabled: env::var("DEMO_LOGIN_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            database_url: None,
            jwt_secret: "secret".to_string(),
            demo_login_enabled: false,
        }
    }
}
