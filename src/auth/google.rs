// src/auth/google.rs
//! Google OAuth2 authorization-code provider

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, error, warn};

use super::provider::{
    OAuthProvider, ProviderFailure, ProviderIdentity, ProviderResult, ProviderTokenSet,
};
use crate::common::safe_email_log;

pub const PROVIDER_NAME: &str = "google";

const SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
    "openid",
];

#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Google endpoint URLs, overridable for tests
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: Option<String>,
    email: String,
    verified_email: Option<bool>,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl From<GoogleUserInfo> for ProviderIdentity {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            email: info.email,
            provider_id: info.id,
            name: info.name,
            picture: info.picture,
            given_name: info.given_name,
            family_name: info.family_name,
            verified_email: info.verified_email,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthClient {
    config: GoogleOAuthConfig,
    endpoints: GoogleEndpoints,
    http: Client,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig, http: Client) -> Self {
        Self {
            config,
            endpoints: GoogleEndpoints::default(),
            http,
        }
    }

    #[allow(dead_code)]
    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// POST a form to the token endpoint and parse the token set
    async fn token_request(
        &self,
        params: &[(&str, &str)],
        failure_message: &str,
    ) -> ProviderResult<ProviderTokenSet> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, endpoint = %self.endpoints.token_url, "HTTP error contacting Google token endpoint");
                ProviderFailure::new(failure_message, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, error = %error_text, "Google token endpoint rejected request");
            return Err(ProviderFailure::new(
                failure_message,
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        response.json::<ProviderTokenSet>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Google token response");
            ProviderFailure::new(failure_message, e.to_string())
        })
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn build_login_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&scope={}&redirect_uri={}&state={}",
            self.endpoints.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&SCOPES.join(" ")),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> ProviderResult<ProviderTokenSet> {
        debug!("Exchanging authorization code for Google tokens");

        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        self.token_request(&params, "Failed to exchange authorization code")
            .await
    }

    async fn fetch_profile(&self, access_token: &str) -> ProviderResult<ProviderIdentity> {
        const FAILURE: &str = "Failed to get user profile";

        let response = self
            .http
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, endpoint = %self.endpoints.userinfo_url, "HTTP error contacting Google userinfo endpoint");
                ProviderFailure::new(FAILURE, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, error = %error_text, "Google userinfo endpoint rejected request");
            return Err(ProviderFailure::new(
                FAILURE,
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        let info = response.json::<GoogleUserInfo>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Google userinfo response");
            ProviderFailure::new(FAILURE, e.to_string())
        })?;

        debug!(
            email = %safe_email_log(&info.email),
            verified = ?info.verified_email,
            "Fetched Google profile"
        );

        Ok(info.into())
    }

    async fn refresh_provider_token(
        &self,
        refresh_token: &str,
    ) -> ProviderResult<ProviderTokenSet> {
        debug!("Refreshing Google access token");

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        self.token_request(&params, "Failed to refresh provider token")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-id.apps.googleusercontent.com".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost:3003/auth/google/redirect".to_string(),
        }
    }

    fn client_for(server: &MockServer) -> GoogleOAuthClient {
        GoogleOAuthClient::new(config(), Client::new()).with_endpoints(GoogleEndpoints {
            auth_url: format!("{}/auth", server.uri()),
            token_url: format!("{}/token", server.uri()),
            userinfo_url: format!("{}/userinfo", server.uri()),
        })
    }

    #[test]
    fn test_login_url_embeds_parameters() {
        let client = GoogleOAuthClient::new(config(), Client::new());

        let url = client.build_login_url("ctx 1/2");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-id.apps.googleusercontent.com"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3003%2Fauth%2Fgoogle%2Fredirect"
        ));
        assert!(url.contains("openid"));
        assert!(url.contains("userinfo.email"));
        assert!(url.ends_with("&state=ctx%201%2F2"));
    }

    #[test]
    fn test_login_url_is_deterministic() {
        let client = GoogleOAuthClient::new(config(), Client::new());
        assert_eq!(client.build_login_url(""), client.build_login_url(""));
        assert!(client.build_login_url("").ends_with("&state="));
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("client-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.access",
                "expires_in": 3599,
                "scope": "openid",
                "token_type": "Bearer",
                "id_token": "id.token.value"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = client_for(&server)
            .exchange_code("auth-code")
            .await
            .expect("exchange should succeed");

        assert_eq!(tokens.access_token, "ya29.access");
        assert_eq!(tokens.id_token.as_deref(), Some("id.token.value"));
        assert_eq!(tokens.refresh_token, None);
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })),
            )
            .mount(&server)
            .await;

        let failure = client_for(&server)
            .exchange_code("used-code")
            .await
            .expect_err("exchange should fail");

        assert_eq!(failure.message, "Failed to exchange authorization code");
        assert!(failure.cause.contains("400"));
        assert!(failure.cause.contains("invalid_grant"));
    }

    #[tokio::test]
    async fn test_exchange_code_transport_error() {
        let client = GoogleOAuthClient::new(config(), Client::new()).with_endpoints(
            GoogleEndpoints {
                token_url: "http://127.0.0.1:1/token".to_string(),
                ..GoogleEndpoints::default()
            },
        );

        let failure = client.exchange_code("code").await.expect_err("should fail");
        assert_eq!(failure.message, "Failed to exchange authorization code");
    }

    #[tokio::test]
    async fn test_fetch_profile_maps_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer ya29.access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1234567890",
                "email": "u@example.com",
                "verified_email": true,
                "name": "U",
                "given_name": "U",
                "family_name": "Example",
                "picture": "https://example.com/u.png"
            })))
            .mount(&server)
            .await;

        let identity = client_for(&server)
            .fetch_profile("ya29.access")
            .await
            .expect("profile fetch should succeed");

        assert_eq!(identity.email, "u@example.com");
        assert_eq!(identity.provider_id.as_deref(), Some("1234567890"));
        assert_eq!(identity.name.as_deref(), Some("U"));
        assert_eq!(identity.family_name.as_deref(), Some("Example"));
        assert_eq!(identity.verified_email, Some(true));
    }

    #[tokio::test]
    async fn test_fetch_profile_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let failure = client_for(&server)
            .fetch_profile("expired")
            .await
            .expect_err("profile fetch should fail");

        assert_eq!(failure.message, "Failed to get user profile");
        assert!(failure.cause.contains("401"));
    }

    #[tokio::test]
    async fn test_refresh_provider_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=provider-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.fresh",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = client_for(&server)
            .refresh_provider_token("provider-refresh")
            .await
            .expect("refresh should succeed");

        assert_eq!(tokens.access_token, "ya29.fresh");
        assert_eq!(tokens.id_token, None);
    }
}
