// src/main.rs
use axum::{extract::Extension, http::HeaderValue, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod health;
mod logging_middleware;
mod users;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::{AuthOrchestrator, GoogleOAuthClient, TokenService};
use common::config::AppConfig;
use common::dev_mode::{apply_cli_override, attach_error_details, log_runtime_status};
use common::AppState;
use users::SqliteUserDirectory;

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

/// Compose every route with the shared state and request-level middleware
pub fn app_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::health_routes())
        .merge(auth::auth_routes())
        .fallback(common::error::not_found_handler);

    if state.runtime_env.is_development() {
        app = app.layer(middleware::from_fn(attach_error_details));
    }

    app.layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(state))
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env()?;
    let runtime_env = apply_cli_override(config.runtime_env);
    log_runtime_status(runtime_env);

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool, config.reset_db).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().build()?;

    let tokens = Arc::new(TokenService::new(&config.tokens)?);
    info!(
        access_ttl_minutes = config.tokens.access_ttl.num_minutes(),
        refresh_ttl_days = config.tokens.refresh_ttl.num_days(),
        "TokenService initialized"
    );

    let google = Arc::new(GoogleOAuthClient::new(config.google.clone(), http_client));
    let directory = Arc::new(SqliteUserDirectory::new(pool));

    let auth = Arc::new(AuthOrchestrator::new(tokens.clone(), directory).with_provider(google));
    info!("AuthOrchestrator initialized");

    let state = Arc::new(AppState {
        auth,
        tokens,
        runtime_env,
    });

    // ========================================================================
    // MIDDLEWARE AND LAYERS
    // ========================================================================

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true);

    let app = app_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    info!(env = %runtime_env, "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server closed");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
