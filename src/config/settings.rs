use std::env;

/// Application settings loaded from the environment (.env supported)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub cors_origin: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// A missing or empty JWT_SECRET is a fatal configuration error caught
    /// here at startup; token signing never fails per-request because of it.
    pub fn from_env() -> Result<Self, SettingsError> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(SettingsError::Missing("JWT_SECRET"))?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://admin.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let cors_origin = env::var("CORS_ORIGIN").ok().filter(|s| !s.is_empty());

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            cors_origin,
        })
    }
}
