//! Server configuration, read from the environment (and a `.env` file if present).

use std::env;

pub mod defaults {
    pub const DATABASE_URL: &str = "sqlite://quidproquo.db?mode=rwc";
    pub const HOST: &str = "127.0.0.1";
    pub const PORT: u16 = 8080;
    pub const MAX_CONNECTIONS: u32 = 16;
    pub const SESSION_MINUTES: i64 = 60;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite connection string, e.g. `sqlite://quidproquo.db?mode=rwc`
    pub database_url: String,
    pub max_connections: u32,
    /// Sessions expire after this many minutes without a request
    pub session_minutes: i64,
    /// Only send the session cookie over HTTPS
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_owned(),
            port: defaults::PORT,
            database_url: defaults::DATABASE_URL.to_owned(),
            max_connections: defaults::MAX_CONNECTIONS,
            session_minutes: defaults::SESSION_MINUTES,
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Environment variables:
    /// - `DATABASE_URL`
    /// - `QPQ_HOST`, `QPQ_PORT`
    /// - `QPQ_MAX_CONNECTIONS`
    /// - `QPQ_SESSION_MINUTES`
    /// - `QPQ_SECURE_COOKIES` (`true`/`false`)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let port = match lookup("QPQ_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue("QPQ_PORT must be a valid port number"))?,
            None => defaults.port,
        };

        let max_connections = match lookup("QPQ_MAX_CONNECTIONS") {
            Some(n) => match n.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "QPQ_MAX_CONNECTIONS must be a positive number",
                    ));
                }
            },
            None => defaults.max_connections,
        };

        let session_minutes = match lookup("QPQ_SESSION_MINUTES") {
            Some(n) => match n.parse::<i64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "QPQ_SESSION_MINUTES must be a positive number",
                    ));
                }
            },
            None => defaults.session_minutes,
        };

        let secure_cookies = match lookup("QPQ_SECURE_COOKIES").as_deref() {
            Some("true" | "1") => true,
            Some("false" | "0") | None => false,
            Some(_) => {
                return Err(ConfigError::InvalidValue(
                    "QPQ_SECURE_COOKIES must be 'true' or 'false'",
                ));
            }
        };

        Ok(Config {
            host: lookup("QPQ_HOST").unwrap_or(defaults.host),
            port,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections,
            session_minutes,
            secure_cookies,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),
}
