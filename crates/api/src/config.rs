use std::time::Duration;

use deskrelay_core::sweep::{
    parse_time_zone, SweepConfig, DEFAULT_DEVICE_CHECK_INTERVAL_SECS,
    DEFAULT_DEVICE_OFFLINE_AFTER_SECS, DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
    DEFAULT_SESSION_TIMEOUT_SECS,
};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret, which must be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background jobs to stop (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Background sweeper schedules.
    pub jobs: JobsConfig,
}

/// Schedules for the two background sweepers.
#[derive(Debug, Clone, Copy)]
pub struct JobsConfig {
    /// Marks devices offline once their heartbeat is older than the window.
    pub presence: SweepConfig,
    /// Closes audit sessions left open longer than the window.
    pub session: SweepConfig,
}

impl JobsConfig {
    /// Load sweeper schedules from environment variables.
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `DEVICE_CHECK_INTERVAL_SECS`  | `30`    |
    /// | `DEVICE_OFFLINE_AFTER_SECS`   | `30`    |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `300`   |
    /// | `SESSION_TIMEOUT_SECS`        | `7200`  |
    /// | `DB_TIME_ZONE`                | `UTC`   |
    ///
    /// # Panics
    ///
    /// Panics if a value does not parse.
    pub fn from_env() -> Self {
        let time_zone = parse_time_zone(&std::env::var("DB_TIME_ZONE").unwrap_or_default())
            .unwrap_or_else(|e| panic!("DB_TIME_ZONE: {e}"));

        let presence = SweepConfig::new(
            secs_from_env("DEVICE_CHECK_INTERVAL_SECS", DEFAULT_DEVICE_CHECK_INTERVAL_SECS),
            secs_from_env("DEVICE_OFFLINE_AFTER_SECS", DEFAULT_DEVICE_OFFLINE_AFTER_SECS),
            time_zone,
        );
        let session = SweepConfig::new(
            secs_from_env("SESSION_SWEEP_INTERVAL_SECS", DEFAULT_SESSION_SWEEP_INTERVAL_SECS),
            secs_from_env("SESSION_TIMEOUT_SECS", DEFAULT_SESSION_TIMEOUT_SECS),
            time_zone,
        );

        Self { presence, session }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    ///
    /// JWT and job settings are read by [`JwtConfig::from_env`] and
    /// [`JobsConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            jobs: JobsConfig::from_env(),
        }
    }
}

fn secs_from_env(var: &str, default: u64) -> Duration {
    let secs: u64 = match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{var} must be a whole number of seconds")),
        Err(_) => default,
    };
    Duration::from_secs(secs)
}
