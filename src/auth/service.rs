//! Login, callback and refresh flows
//!
//! Every flow is a stateless unit of work. The callback steps run strictly in
//! sequence and stop at the first failure; authorization codes are single
//! use, so nothing is retried.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::provider::{OAuthProvider, ProviderIdentity};
use super::tokens::{TokenPair, TokenService, TokenSubject};
use crate::common::safe_email_log;
use crate::users::{User, UserAttrs, UserDirectory};

/// Tokens plus the user they were issued for
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

impl AuthSession {
    fn new(tokens: TokenPair, user: User) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
}

pub struct AuthOrchestrator {
    providers: HashMap<String, Arc<dyn OAuthProvider>>,
    tokens: Arc<TokenService>,
    users: Arc<dyn UserDirectory>,
}

impl AuthOrchestrator {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            providers: HashMap::new(),
            tokens,
            users,
        }
    }

    /// Register a provider under its own name, replacing any previous one
    pub fn with_provider(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    fn provider(&self, name: &str) -> Result<&Arc<dyn OAuthProvider>, AuthError> {
        self.providers.get(name).ok_or_else(|| {
            warn!(provider = %name, "Unknown OAuth provider requested");
            AuthError::UnknownProvider(name.to_string())
        })
    }

    /// Consent page URL for `provider_name`, carrying `state` verbatim
    pub fn login_url(&self, provider_name: &str, state: &str) -> Result<String, AuthError> {
        let provider = self.provider(provider_name)?;
        Ok(provider.build_login_url(state))
    }

    /// Complete the authorization-code flow and issue tokens
    ///
    /// `state` is passed through unchecked; matching it against the value
    /// handed out by [`login_url`](Self::login_url) is the caller's job.
    pub async fn redirect_callback(
        &self,
        provider_name: &str,
        code: &str,
        state: &str,
    ) -> Result<AuthSession, AuthError> {
        let provider = self.provider(provider_name)?;

        if code.is_empty() {
            warn!(provider = %provider_name, "Provider redirected without an authorization code");
            return Err(AuthError::MissingCode);
        }

        debug!(provider = %provider_name, state = %state, "redirect.login.tokens");
        let provider_tokens = provider
            .exchange_code(code)
            .await
            .map_err(AuthError::InvalidCredentials)?;

        debug!(provider = %provider_name, "redirect.login.profile");
        let identity = provider
            .fetch_profile(&provider_tokens.access_token)
            .await
            .map_err(AuthError::ProfileFetchFailed)?;

        self.login_or_register(&identity).await
    }

    /// Upsert the local user for `identity` and issue a token pair
    pub async fn login_or_register(
        &self,
        identity: &ProviderIdentity,
    ) -> Result<AuthSession, AuthError> {
        let attrs = UserAttrs {
            name: identity.name.clone(),
        };

        let user = self
            .users
            .find_or_create_user(&identity.email, &attrs)
            .await?
            .ok_or_else(|| {
                warn!(email = %safe_email_log(&identity.email), "User directory returned no user");
                AuthError::UserCreationFailed
            })?;

        let tokens = self.tokens.generate_tokens(&TokenSubject {
            sub: user.id.clone(),
            email: user.email.clone(),
        })?;

        info!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            "User authenticated"
        );

        Ok(AuthSession::new(tokens, user))
    }

    /// Mint a new access token from a valid refresh token
    ///
    /// The refresh token itself is neither rotated nor revoked.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<AccessToken, AuthError> {
        let claims = self
            .tokens
            .verify_refresh_token(refresh_token)
            .ok_or(AuthError::InvalidRefreshToken)?;

        if claims.sub.is_empty() {
            warn!("Refresh token without subject");
            return Err(AuthError::InvalidRefreshToken);
        }

        if self.users.get_user_by_id(&claims.sub).await?.is_none() {
            warn!(user_id = %claims.sub, "Refresh token subject no longer exists");
            return Err(AuthError::InvalidRefreshToken);
        }

        let access_token = self.tokens.sign_access_token(&TokenSubject {
            sub: claims.sub,
            email: claims.email,
        })?;

        Ok(AccessToken { access_token })
    }

    pub async fn get_authed_user(&self, user_id: &str) -> Result<User, AuthError> {
        self.users
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)
    }
}
