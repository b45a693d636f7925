use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_max_retries: u32,
    pub db_retry_interval: Duration,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub app_env: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let config = Self {
            port: parse_var("PORT", 8080)?,
            database_url: database_url_from_env(),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 25)?,
            db_max_retries: parse_var("DB_MAX_RETRIES", 5)?,
            db_retry_interval: Duration::from_secs(parse_var("DB_RETRY_INTERVAL_SECS", 2)?),
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 10)?),
            shutdown_timeout: Duration::from_secs(parse_var("SHUTDOWN_TIMEOUT_SECS", 15)?),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("PORT must be non-zero");
        }
        if self.db_max_retries == 0 {
            bail!("DB_MAX_RETRIES must be at least 1");
        }
        if self.db_max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the `DB_*` parts.
fn database_url_from_env() -> String {
    if let Ok(url) = env::var("DATABASE_URL") {
        return url;
    }

    let host = env::var("DB_HOST").unwrap_or_else(|_| "db".to_string());
    let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
    let user = env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = env::var("DB_PASSWORD").unwrap_or_else(|_| "postgres".to_string());
    let name = env::var("DB_NAME").unwrap_or_else(|_| "reviews".to_string());

    format!(
        "postgres://{}:{}@{}:{}/{}?sslmode=disable",
        user, password, host, port, name
    )
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
