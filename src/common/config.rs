//! Service configuration loaded from the environment
//!
//! Every key is enumerated here. Missing or inconsistent required values are
//! startup failures, never per-request errors.

use chrono::Duration;
use std::env;
use thiserror::Error;

use crate::auth::google::GoogleOAuthConfig;
use crate::auth::tokens::TokenConfig;
use crate::common::dev_mode::RuntimeEnv;

const DEFAULT_ACCESS_TTL_MINUTES: i64 = 30;
const DEFAULT_REFRESH_TTL_DAYS: i64 = 14;
const DEFAULT_PORT: u16 = 3003;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("JWT_SECRET and REFRESH_SECRET must differ")]
    SharedSecret,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub runtime_env: RuntimeEnv,
    /// Drop and recreate the schema on startup
    pub reset_db: bool,
    pub google: GoogleOAuthConfig,
    pub tokens: TokenConfig,
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Empty strings count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let access_secret = require("JWT_SECRET")?;
        let refresh_secret = require("REFRESH_SECRET")?;
        if access_secret == refresh_secret {
            return Err(ConfigError::SharedSecret);
        }

        let access_minutes = parse_positive(
            "ACCESS_TOKEN_TTL_MINUTES",
            get("ACCESS_TOKEN_TTL_MINUTES"),
            DEFAULT_ACCESS_TTL_MINUTES,
        )?;
        let refresh_days = parse_positive(
            "REFRESH_TOKEN_TTL_DAYS",
            get("REFRESH_TOKEN_TTL_DAYS"),
            DEFAULT_REFRESH_TTL_DAYS,
        )?;

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let runtime_env = match get("APP_ENV") {
            Some(raw) => raw.parse::<RuntimeEnv>().map_err(|reason| ConfigError::Invalid {
                key: "APP_ENV",
                reason,
            })?,
            None => RuntimeEnv::Development,
        };

        let reset_db = match get("RESET_DB") {
            Some(raw) => raw.trim().parse::<bool>().map_err(|e| ConfigError::Invalid {
                key: "RESET_DB",
                reason: e.to_string(),
            })?,
            None => false,
        };

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://identity_api.db".to_string()),
            cors_origins,
            runtime_env,
            reset_db,
            google: GoogleOAuthConfig {
                client_id: require("GOOGLE_CLIENT_ID")?,
                client_secret: require("GOOGLE_CLIENT_SECRET")?,
                redirect_uri: require("GOOGLE_CALLBACK_URL")?,
            },
            tokens: TokenConfig {
                access_secret,
                refresh_secret,
                access_ttl: Duration::minutes(access_minutes),
                refresh_ttl: Duration::days(refresh_days),
            },
        })
    }
}

fn parse_positive(key: &'static str, raw: Option<String>, default: i64) -> Result<i64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v > 0 => Ok(v),
        Ok(v) => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a positive integer, got {}", v),
        }),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("JWT_SECRET", "access-secret"),
            ("REFRESH_SECRET", "refresh-secret"),
            ("GOOGLE_CLIENT_ID", "client-id"),
            ("GOOGLE_CLIENT_SECRET", "client-secret"),
            ("GOOGLE_CALLBACK_URL", "http://localhost:3003/auth/google/redirect"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_env()).expect("config should load");

        assert_eq!(config.port, 3003);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.runtime_env, RuntimeEnv::Development);
        assert_eq!(config.tokens.access_ttl, Duration::minutes(30));
        assert_eq!(config.tokens.refresh_ttl, Duration::days(14));
        assert_eq!(config.cors_origins.len(), 2);
        assert!(!config.reset_db);
    }

    #[test]
    fn test_reset_db_flag() {
        let mut vars = base_env();
        vars.insert("RESET_DB", "true");
        assert!(load(&vars).expect("config should load").reset_db);

        vars.insert("RESET_DB", "yes");
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { key: "RESET_DB", .. })));
    }

    #[test]
    fn test_missing_refresh_secret_is_fatal() {
        let mut vars = base_env();
        vars.remove("REFRESH_SECRET");

        assert!(matches!(load(&vars), Err(ConfigError::Missing("REFRESH_SECRET"))));
    }

    #[test]
    fn test_blank_secret_counts_as_missing() {
        let mut vars = base_env();
        vars.insert("JWT_SECRET", "   ");

        assert!(matches!(load(&vars), Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn test_shared_secret_rejected() {
        let mut vars = base_env();
        vars.insert("REFRESH_SECRET", "access-secret");

        assert!(matches!(load(&vars), Err(ConfigError::SharedSecret)));
    }

    #[test]
    fn test_ttl_overrides_and_validation() {
        let mut vars = base_env();
        vars.insert("ACCESS_TOKEN_TTL_MINUTES", "5");
        vars.insert("REFRESH_TOKEN_TTL_DAYS", "1");
        let config = load(&vars).expect("config should load");
        assert_eq!(config.tokens.access_ttl, Duration::minutes(5));
        assert_eq!(config.tokens.refresh_ttl, Duration::days(1));

        vars.insert("ACCESS_TOKEN_TTL_MINUTES", "0");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "ACCESS_TOKEN_TTL_MINUTES", .. })
        ));
    }

    #[test]
    fn test_unknown_app_env_rejected() {
        let mut vars = base_env();
        vars.insert("APP_ENV", "staging");

        assert!(matches!(load(&vars), Err(ConfigError::Invalid { key: "APP_ENV", .. })));
    }
}
