//! Authentication extractors and middleware for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::AuthError;
use super::tokens::extract_token_from_header;
use crate::common::{safe_email_log, ApiError, AppState};

/// Verified access-token claims for the current request
///
/// Resolved from the `Authorization` header once, then cached in the
/// request extensions. No session store or directory lookup is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub sub: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<AuthenticatedPrincipal>() {
            return Ok(principal.clone());
        }

        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let header = parts.headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());

        let Some(token) = extract_token_from_header(header) else {
            warn!(
                has_header = header.is_some(),
                "Authentication failed: missing or malformed bearer token"
            );
            return Err(AuthError::Unauthorized.into());
        };

        let Some(claims) = app_state.tokens.verify_access_token(token) else {
            warn!("Authentication failed: access token rejected");
            return Err(AuthError::Unauthorized.into());
        };

        debug!(
            user_id = %claims.sub,
            email = %safe_email_log(&claims.email),
            "Access token verified"
        );

        let principal = AuthenticatedPrincipal {
            sub: claims.sub,
            email: claims.email,
        };
        parts.extensions.insert(principal.clone());
        Ok(principal)
    }
}

/// Route layer rejecting requests without a valid access token
pub async fn require_auth(
    principal: AuthenticatedPrincipal,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(principal);
    next.run(request).await
}
