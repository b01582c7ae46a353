//! Authentication error taxonomy

use axum::http::StatusCode;
use thiserror::Error;

use super::provider::ProviderFailure;
use crate::users::DirectoryError;

/// Failures of the login, callback and refresh flows
///
/// Each variant maps to a stable code and an HTTP status; the `Display`
/// text may include internal causes and is only meant for logs.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("provider '{0}' is not implemented")]
    UnknownProvider(String),

    #[error("authorization code is missing")]
    MissingCode,

    #[error("provider token exchange rejected: {0}")]
    InvalidCredentials(ProviderFailure),

    #[error("provider profile fetch failed: {0}")]
    ProfileFetchFailed(ProviderFailure),

    #[error("user directory did not return a user")]
    UserCreationFailed,

    #[error("refresh token rejected")]
    InvalidRefreshToken,

    #[error("missing or invalid access token")]
    Unauthorized,

    #[error("user not found")]
    NotFound,

    #[error("user directory failure: {0}")]
    Directory(#[from] DirectoryError),

    #[error("token signing failed: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::UnknownProvider(_) | AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::MissingCode
            | AuthError::UserCreationFailed
            | AuthError::InvalidRefreshToken => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials(_)
            | AuthError::ProfileFetchFailed(_)
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Directory(_) | AuthError::TokenSigning(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            AuthError::MissingCode => "MISSING_CODE",
            AuthError::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            AuthError::ProfileFetchFailed(_) => "PROFILE_FETCH_FAILED",
            AuthError::UserCreationFailed => "USER_CREATION_FAILED",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::NotFound => "NOT_FOUND",
            AuthError::Directory(_) | AuthError::TokenSigning(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to API clients
    pub fn public_message(&self) -> String {
        match self {
            AuthError::UnknownProvider(name) => format!("{} is not implemented", name),
            AuthError::MissingCode => "Authorization code is required".to_string(),
            AuthError::InvalidCredentials(_) => "Please check your credentials".to_string(),
            AuthError::ProfileFetchFailed(_) => "Something wrong with your profile".to_string(),
            AuthError::UserCreationFailed => "Failed to create user".to_string(),
            AuthError::InvalidRefreshToken => "Invalid or expired refresh token".to_string(),
            AuthError::Unauthorized => "Not authorized".to_string(),
            AuthError::NotFound => "User not found".to_string(),
            AuthError::Directory(_) | AuthError::TokenSigning(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Internal cause worth surfacing on the diagnostic channel, if any
    pub fn internal_detail(&self) -> Option<String> {
        match self {
            AuthError::InvalidCredentials(_)
            | AuthError::ProfileFetchFailed(_)
            | AuthError::Directory(_)
            | AuthError::TokenSigning(_) => Some(self.to_string()),
            _ => None,
        }
    }
}
