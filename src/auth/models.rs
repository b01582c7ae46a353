//! Authentication request models

use serde::Deserialize;

use crate::common::{ValidationResult, Validator};

/// Query string of `GET /auth/{provider}`
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub state: Option<String>,
}

/// Query string the provider redirects back with
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Body of `POST /auth/refresh`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

impl Validator for RefreshTokenRequest {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if self.refresh_token.trim().is_empty() {
            result.add_error("refreshToken", "must not be empty");
        }
        result
    }
}
