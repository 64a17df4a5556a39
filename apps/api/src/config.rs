use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgConnectOptions;

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub port: u16,
    pub public_dir: PathBuf,
    /// Prefix for image URLs embedded in rendered letters. The PDF renderer
    /// fetches them back from this server, so it must be reachable locally.
    pub public_base_url: String,
    pub pdf: PdfConfig,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PdfConfig {
    pub chrome_path: Option<PathBuf>,
    pub max_concurrency: usize,
    pub timeout: Duration,
    pub sandbox: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let port = parse_env("PORT", 3001u16)?;

        Ok(Config {
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL").ok(),
                host: env_or("DB_HOST", "localhost"),
                port: parse_env("DB_PORT", 5432u16)?,
                user: env_or("DB_USER", "postgres"),
                password: env_or("DB_PASSWORD", ""),
                name: env_or("DB_NAME", "appreciation"),
                max_connections: parse_env("DB_MAX_CONNECTIONS", 10u32)?,
                acquire_timeout: Duration::from_secs(parse_env("DB_ACQUIRE_TIMEOUT_SECS", 5u64)?),
            },
            port,
            public_dir: PathBuf::from(env_or("PUBLIC_DIR", "public")),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            pdf: PdfConfig {
                chrome_path: std::env::var("CHROME_PATH").ok().map(PathBuf::from),
                max_concurrency: parse_env("PDF_MAX_CONCURRENCY", 2usize)?.max(1),
                timeout: Duration::from_secs(parse_env("PDF_TIMEOUT_SECS", 30u64)?),
                sandbox: parse_env("PDF_SANDBOX", true)?,
            },
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

impl DatabaseConfig {
    /// Connection options for the pool. `DATABASE_URL` wins over the parts.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return url
                .parse::<PgConnectOptions>()
                .context("DATABASE_URL is not a valid PostgreSQL URL");
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        Ok(options)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(public_dir: PathBuf) -> Self {
        Config {
            database: DatabaseConfig {
                url: None,
                host: "localhost".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: String::new(),
                name: "appreciation_test".to_string(),
                max_connections: 2,
                acquire_timeout: Duration::from_secs(1),
            },
            port: 3001,
            public_dir,
            public_base_url: "http://localhost:3001".to_string(),
            pdf: PdfConfig {
                chrome_path: None,
                max_concurrency: 1,
                timeout: Duration::from_secs(5),
                sandbox: false,
            },
            rust_log: "debug".to_string(),
        }
    }
}
