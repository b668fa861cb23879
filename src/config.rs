use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secure: bool,
    pub inactivity_minutes: i64,
    /// How often expired session rows are purged.
    pub cleanup_minutes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let session = SessionConfig {
            secure: std::env::var("SESSION_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            inactivity_minutes: std::env::var("SESSION_INACTIVITY_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 7),
            cleanup_minutes: std::env::var("SESSION_CLEANUP_MINUTES")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|m| *m > 0)
                .unwrap_or(60),
        };
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            session,
        })
    }
}
