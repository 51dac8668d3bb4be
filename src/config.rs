use std::env;
use std::net::IpAddr;
use std::str::FromStr;

use anyhow::Context;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_URL: &str = "tasks.db";
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 2000;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub pool_size: u32,
    /// Origins allowed to call the API from a browser. `*` allows any.
    pub allowed_origins: Vec<String>,
    pub bcrypt_cost: u32,
    pub max_message_length: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            pool_size: 8,
            allowed_origins: vec![DEFAULT_ORIGIN.to_string()],
            bcrypt_cost: bcrypt::DEFAULT_COST,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
        }
    }
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        _ => Ok(default),
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = AppConfig::default();

        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(raw) if !parse_origins(&raw).is_empty() => parse_origins(&raw),
            _ => defaults.allowed_origins,
        };
        let pool_size = parsed("DB_POOL_SIZE", defaults.pool_size)?;
        if pool_size == 0 {
            anyhow::bail!("DB_POOL_SIZE must be at least 1");
        }

        Ok(AppConfig {
            host: parsed("HOST", defaults.host)?,
            port: parsed("PORT", defaults.port)?,
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            pool_size,
            allowed_origins,
            bcrypt_cost: parsed("BCRYPT_COST", defaults.bcrypt_cost)?,
            max_message_length: parsed("MAX_MESSAGE_LENGTH", defaults.max_message_length)?,
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}
