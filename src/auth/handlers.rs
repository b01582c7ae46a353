//! Authentication handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::extractors::AuthenticatedPrincipal;
use super::models::{CallbackQuery, LoginQuery, RefreshTokenRequest};
use super::service::{AccessToken, AuthSession};
use crate::common::{ApiError, AppState, Validator};
use crate::users::User;

/// GET /auth/{provider}
/// Redirects (302) to the provider's consent page
///
/// `state` is optional and forwarded verbatim; it defaults to empty.
pub async fn login_start(
    Extension(state): Extension<Arc<AppState>>,
    Path(provider): Path<String>,
    query: Result<Query<LoginQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let url = state
        .auth
        .login_url(&provider, query.state.as_deref().unwrap_or_default())?;

    debug!(provider = %provider, "Redirecting to provider consent page");
    Ok((StatusCode::FOUND, [(LOCATION, url)]).into_response())
}

/// GET /auth/{provider}/redirect
/// Provider-facing callback: exchanges the code and issues tokens
///
/// # Response
/// ```json
/// {
///   "accessToken": "<jwt>",
///   "refreshToken": "<jwt>",
///   "user": { ... }
/// }
/// ```
pub async fn redirect_callback(
    Extension(state): Extension<Arc<AppState>>,
    Path(provider): Path<String>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Result<Json<AuthSession>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if let Some(reason) = &query.error {
        warn!(provider = %provider, oauth_error = %reason, "Provider returned an error instead of a code");
    }

    let session = state
        .auth
        .redirect_callback(
            &provider,
            query.code.as_deref().unwrap_or_default(),
            query.state.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(session))
}

/// GET /auth/me
/// Returns the local user behind the verified access token
pub async fn me_handler(
    Extension(state): Extension<Arc<AppState>>,
    principal: AuthenticatedPrincipal,
) -> Result<Json<User>, ApiError> {
    let user = state.auth.get_authed_user(&principal.sub).await?;
    Ok(Json(user))
}

/// POST /auth/refresh
/// Exchanges a refresh token for a fresh access token
///
/// # Request Body
/// ```json
/// { "refreshToken": "<jwt>" }
/// ```
pub async fn refresh_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<AccessToken>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    payload.validate().into_result()?;

    let access = state.auth.refresh_access_token(&payload.refresh_token).await?;
    info!("Access token refreshed");
    Ok(Json(access))
}
