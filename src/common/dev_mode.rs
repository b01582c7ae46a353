// src/common/dev_mode.rs
//! Runtime environment and the development-only diagnostic channel
//!
//! Internal error causes are attached to responses as an [`ErrorDetails`]
//! extension. Only the development build of the router merges them into the
//! response body; everywhere else they stay in the logs.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Upper bound for error bodies rewritten by [`attach_error_details`]
const MAX_ERROR_BODY: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Development,
    Production,
    Test,
}

impl RuntimeEnv {
    pub fn is_development(&self) -> bool {
        matches!(self, RuntimeEnv::Development)
    }
}

impl FromStr for RuntimeEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(RuntimeEnv::Development),
            "production" | "prod" => Ok(RuntimeEnv::Production),
            "test" => Ok(RuntimeEnv::Test),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

impl fmt::Display for RuntimeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEnv::Development => write!(f, "development"),
            RuntimeEnv::Production => write!(f, "production"),
            RuntimeEnv::Test => write!(f, "test"),
        }
    }
}

/// Internal cause of a failed request, carried as a response extension
#[derive(Debug, Clone)]
pub struct ErrorDetails(pub String);

/// CLI argument parsing for the runtime environment
fn parse_env_args<I>(args: I) -> Option<RuntimeEnv>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter().find_map(|arg| match arg.as_str() {
        "--dev" | "--dev-mode" => Some(RuntimeEnv::Development),
        "--prod" | "--production" => Some(RuntimeEnv::Production),
        _ => None,
    })
}

/// Override the configured environment from CLI args
pub fn apply_cli_override(configured: RuntimeEnv) -> RuntimeEnv {
    match parse_env_args(env::args().skip(1)) {
        Some(overridden) => {
            info!(from = %configured, to = %overridden, "CLI override of APP_ENV");
            overridden
        }
        None => configured,
    }
}

/// Log the runtime environment on startup
pub fn log_runtime_status(runtime_env: RuntimeEnv) {
    if runtime_env.is_development() {
        warn!("Development mode: internal error details are included in responses");
    } else {
        info!(env = %runtime_env, "Internal error details are hidden from responses");
    }
}

/// Merges [`ErrorDetails`] into JSON error bodies as `error.details`
///
/// Layered onto the router only in development mode.
pub async fn attach_error_details(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(ErrorDetails(details)) = response.extensions().get::<ErrorDetails>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Failed to buffer error body for diagnostics");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let mut json = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(json) => json,
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };

    if let Some(error) = json.get_mut("error").and_then(|e| e.as_object_mut()) {
        error.insert("details".to_string(), serde_json::Value::String(details));
    }

    let rewritten = serde_json::to_vec(&json).unwrap_or_else(|_| bytes.to_vec());
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(rewritten))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_env_parsing() {
        assert_eq!("production".parse::<RuntimeEnv>(), Ok(RuntimeEnv::Production));
        assert_eq!(" Dev ".parse::<RuntimeEnv>(), Ok(RuntimeEnv::Development));
        assert_eq!("test".parse::<RuntimeEnv>(), Ok(RuntimeEnv::Test));
        assert!("staging".parse::<RuntimeEnv>().is_err());
    }

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cli_flags() {
        assert_eq!(parse_env_args(args(&["--prod"])), Some(RuntimeEnv::Production));
        assert_eq!(
            parse_env_args(args(&["--verbose", "--dev"])),
            Some(RuntimeEnv::Development)
        );
        assert_eq!(parse_env_args(args(&["--verbose"])), None);
    }
}
