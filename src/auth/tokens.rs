//! Access and refresh token issuance and verification
//!
//! Access and refresh tokens carry the same claim shape and are told apart
//! only by the key that signed them. A refresh token therefore never
//! verifies as an access token, and the payload cannot claim otherwise.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Signing secrets and lifetimes for both token kinds
#[derive(Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenConfigError {
    #[error("token signing secrets must not be empty")]
    EmptySecret,

    #[error("access and refresh tokens must use different secrets")]
    SharedSecret,

    #[error("token lifetimes must be positive")]
    NonPositiveTtl,
}

/// Identity a token pair is issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub sub: String,
    pub email: String,
}

/// JWT claims structure, shared by both token kinds
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

pub struct TokenService {
    access: SigningKeys,
    refresh: SigningKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Result<Self, TokenConfigError> {
        if config.access_secret.is_empty() || config.refresh_secret.is_empty() {
            return Err(TokenConfigError::EmptySecret);
        }
        if config.access_secret == config.refresh_secret {
            return Err(TokenConfigError::SharedSecret);
        }
        if config.access_ttl <= Duration::zero() || config.refresh_ttl <= Duration::zero() {
            return Err(TokenConfigError::NonPositiveTtl);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            access: SigningKeys::from_secret(&config.access_secret),
            refresh: SigningKeys::from_secret(&config.refresh_secret),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            validation,
        })
    }

    /// Sign an access and a refresh token for the same subject
    pub fn generate_tokens(
        &self,
        subject: &TokenSubject,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access_token: self.sign_access_token(subject)?,
            refresh_token: sign(&self.refresh, subject, self.refresh_ttl)?,
        })
    }

    pub fn sign_access_token(
        &self,
        subject: &TokenSubject,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        sign(&self.access, subject, self.access_ttl)
    }

    /// `None` on bad signature, expiry or malformed input
    pub fn verify_access_token(&self, token: &str) -> Option<Claims> {
        self.verify(&self.access, token, "access")
    }

    /// `None` on bad signature, expiry or malformed input
    pub fn verify_refresh_token(&self, token: &str) -> Option<Claims> {
        self.verify(&self.refresh, token, "refresh")
    }

    fn verify(&self, keys: &SigningKeys, token: &str, kind: &str) -> Option<Claims> {
        match decode::<Claims>(token, &keys.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(error = %e, kind = kind, "Token verification failed");
                None
            }
        }
    }
}

fn sign(
    keys: &SigningKeys,
    subject: &TokenSubject,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: subject.sub.clone(),
        email: subject.email.clone(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
}

/// Parse `Bearer <token>`
///
/// Any other scheme, a missing token part, extra parts or stray whitespace
/// yield `None`.
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?;
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}
