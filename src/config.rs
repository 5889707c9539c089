//! Service configuration parsed from environment variables.
//!
//! Parsing goes through a key lookup closure so tests can feed a fixed map
//! instead of mutating the process environment.

use crate::services::accounts::RoleMode;
use crate::services::password::PasswordStorage;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub role_mode: RoleMode,
    pub password_storage: PasswordStorage,
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 5000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `RUN_MIGRATIONS`: default true
    /// - `ACCOUNT_ROLE_MODE`: `required` (default) or `optional`
    /// - `PASSWORD_STORAGE`: `plaintext` (default) or `argon2`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let db_max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            None => true,
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "RUN_MIGRATIONS", value: raw })?,
        };

        let role_mode = match lookup("ACCOUNT_ROLE_MODE") {
            None => RoleMode::Required,
            Some(raw) => RoleMode::parse(&raw).ok_or(ConfigError::Invalid { key: "ACCOUNT_ROLE_MODE", value: raw })?,
        };

        let password_storage = match lookup("PASSWORD_STORAGE") {
            None => PasswordStorage::Plaintext,
            Some(raw) => {
                PasswordStorage::parse(&raw).ok_or(ConfigError::Invalid { key: "PASSWORD_STORAGE", value: raw })?
            }
        };

        Ok(Self { database_url, port, db_max_connections, run_migrations, role_mode, password_storage })
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
