//! Typed settings for the server, the database pool, token signing and lockout.

use std::net::SocketAddr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub jwt: JwtSettings,
    pub lockout: LockoutSettings,
}

#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    /// Serve the OpenAPI document at `/swagger.json`.
    pub enable_docs: bool,
}

/// Token signing settings (HS256).
#[derive(Clone, Debug)]
pub struct JwtSettings {
    pub secret_key: String,
    pub expiration_hours: u32,
    pub issuer: String,
    pub audience: String,
}

/// Account lockout after repeated failed sign-ins.
#[derive(Clone, Copy, Debug)]
pub struct LockoutSettings {
    pub max_failed_attempts: u32,
    pub duration: Duration,
}

impl Default for LockoutSettings {
    fn default() -> Self {
        LockoutSettings {
            max_failed_attempts: 5,
            duration: Duration::from_secs(5 * 60),
        }
    }
}
