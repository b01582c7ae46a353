//! OAuth provider contract
//!
//! One implementation per external identity provider. Adding a provider means
//! implementing [`OAuthProvider`] and registering it with the orchestrator;
//! nothing else changes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens returned by a provider's token endpoint
///
/// Lives for one callback request and is never persisted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderTokenSet {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Identity reported by a provider's profile endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderIdentity {
    pub email: String,
    pub provider_id: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub verified_email: Option<bool>,
}

impl ProviderIdentity {
    #[allow(dead_code)]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            provider_id: None,
            name: None,
            picture: None,
            given_name: None,
            family_name: None,
            verified_email: None,
        }
    }
}

/// Failed provider call: transport error, non-2xx status or unreadable body
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub message: String,
    pub cause: String,
}

impl ProviderFailure {
    pub fn new(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: cause.into(),
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.cause)
    }
}

impl std::error::Error for ProviderFailure {}

/// Outcome of every provider operation; network errors never escape as panics
pub type ProviderResult<T> = Result<T, ProviderFailure>;

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Registry key, e.g. `google`
    fn name(&self) -> &str;

    /// Consent page URL; `state` is embedded verbatim. No I/O.
    fn build_login_url(&self, state: &str) -> String;

    /// authorization_code grant
    async fn exchange_code(&self, code: &str) -> ProviderResult<ProviderTokenSet>;

    async fn fetch_profile(&self, access_token: &str) -> ProviderResult<ProviderIdentity>;

    /// refresh_token grant against the provider, unrelated to the service's own refresh flow
    async fn refresh_provider_token(&self, refresh_token: &str)
        -> ProviderResult<ProviderTokenSet>;
}
