use std::collections::HashSet;

use apresiasi_core::allowance::{validate_quota, DEFAULT_PIN_QUOTA};
use apresiasi_core::roles::RoleOverrides;
use apresiasi_core::types::DbId;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Everything except `JWT_SECRET` has a default suitable for local
/// development.
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
    /// Pins each user may give per period (default: `4`).
    pub pin_quota: i32,
    /// Profile ids forced into the admin or supervisor role.
    pub role_overrides: RoleOverrides,
    /// JWT validation settings.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `PIN_QUOTA`              | `4`                        |
    /// | `ADMIN_PROFILE_IDS`      | empty                      |
    /// | `SUPERVISOR_PROFILE_IDS` | empty                      |
    ///
    /// # Panics
    ///
    /// Panics on any unparsable value so misconfiguration fails at startup.
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

        let pin_quota: i32 = std::env::var("PIN_QUOTA")
            .unwrap_or_else(|_| DEFAULT_PIN_QUOTA.to_string())
            .parse()
            .expect("PIN_QUOTA must be a valid i32");
        if let Err(e) = validate_quota(pin_quota) {
            panic!("{e}");
        }

        let role_overrides = RoleOverrides {
            admin_ids: id_list_from_env("ADMIN_PROFILE_IDS"),
            supervisor_ids: id_list_from_env("SUPERVISOR_PROFILE_IDS"),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            pin_quota,
            role_overrides,
            jwt,
        }
    }
}

fn id_list_from_env(var: &str) -> HashSet<DbId> {
    let raw = std::env::var(var).unwrap_or_default();
    RoleOverrides::parse_id_list(&raw).unwrap_or_else(|e| panic!("{var}: {e}"))
}
