//! Settings validation: reject values the server cannot run with.

use crate::config::Settings;
use crate::error::ConfigError;

/// HS256 keys shorter than the digest size are refused.
pub const MIN_SECRET_LEN: usize = 32;

pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.database.max_connections == 0 {
        return Err(ConfigError::Invalid {
            key: "DATABASE_MAX_CONNECTIONS",
            reason: "must be at least 1".into(),
        });
    }
    if settings.server.request_timeout.is_zero() {
        return Err(ConfigError::Invalid {
            key: "REQUEST_TIMEOUT_SECS",
            reason: "must be at least 1".into(),
        });
    }
    if settings.jwt.secret_key.len() < MIN_SECRET_LEN {
        return Err(ConfigError::Invalid {
            key: "JWT_SECRET",
            reason: format!("must be at least {} bytes", MIN_SECRET_LEN),
        });
    }
    if settings.jwt.expiration_hours == 0 {
        return Err(ConfigError::Invalid {
            key: "JWT_EXPIRATION_HOURS",
            reason: "must be at least 1".into(),
        });
    }
    if settings.lockout.max_failed_attempts == 0 {
        return Err(ConfigError::Invalid {
            key: "LOCKOUT_MAX_FAILED_ATTEMPTS",
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}
