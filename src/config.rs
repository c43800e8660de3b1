use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

/// Connection settings for the PostgreSQL store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    /// Upper bound on waiting for a pooled connection.
    pub acquire_timeout_secs: u64,
    /// Applied as `statement_timeout` on every connection.
    pub statement_timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .options([("statement_timeout", self.statement_timeout_ms.to_string())])
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Server-wide configuration, loaded once at startup and handed to every
/// component that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    /// Signs bearer tokens and derives the password encryption key.
    pub jwt_secret: String,
    pub jwt_expiration_hours: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Unset variables take
    /// their defaults; numeric values that fail to parse fall back as well.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            server_host: text("SERVER_HOST", "0.0.0.0"),
            server_port: parse_or(&lookup, "PORT", 8080),
            database: DatabaseConfig {
                host: text("DB_HOST", "localhost"),
                port: parse_or(&lookup, "DB_PORT", 5432),
                user: text("DB_USER", "postgres"),
                password: text("DB_PASSWORD", "postgres"),
                name: text("DB_NAME", "todo"),
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10),
                acquire_timeout_secs: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5),
                statement_timeout_ms: parse_or(&lookup, "DB_STATEMENT_TIMEOUT_MS", 5000),
            },
            jwt_secret: text("JWT_SECRET", "mysecret"),
            jwt_expiration_hours: parse_or(&lookup, "JWT_EXPIRATION_HOURS", 72),
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server_host.clone(), self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("{key}={raw:?} is not a valid value, using default {default}");
            default
        }),
        None => default,
    }
}
