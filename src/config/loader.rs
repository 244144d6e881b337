//! Load settings from environment variables (or any key lookup, for tests).

use crate::config::settings::*;
use crate::config::validate_settings;
use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_ISSUER: &str = "fornecedor-api";
pub const DEFAULT_AUDIENCE: &str = "https://localhost";

impl Settings {
    /// Read settings from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Settings, ConfigError> {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build and validate settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database = DatabaseSettings {
            url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
        };

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let server = ServerSettings {
            bind_addr: bind_addr.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: format!("{}", e),
            })?,
            request_timeout: Duration::from_secs(parse_or(&get, "REQUEST_TIMEOUT_SECS", 30)?),
            enable_docs: get("APP_ENV")
                .map(|env| env.eq_ignore_ascii_case("development"))
                .unwrap_or(false),
        };

        let jwt = JwtSettings {
            secret_key: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            expiration_hours: parse_or(&get, "JWT_EXPIRATION_HOURS", 2)?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
        };

        let defaults = LockoutSettings::default();
        let lockout = LockoutSettings {
            max_failed_attempts: parse_or(&get, "LOCKOUT_MAX_FAILED_ATTEMPTS", defaults.max_failed_attempts)?,
            duration: match get("LOCKOUT_MINUTES") {
                Some(_) => Duration::from_secs(60 * parse_or::<u64, _>(&get, "LOCKOUT_MINUTES", 5)?),
                None => defaults.duration,
            },
        };

        let settings = Settings {
            database,
            server,
            jwt,
            lockout,
        };
        validate_settings(&settings)?;
        Ok(settings)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
