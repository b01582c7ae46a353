//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - The OAuth provider contract and the Google implementation
//! - Access/refresh JWT issuance and verification
//! - The login, callback and refresh flows
//! - The bearer-token extractor for protected routes

pub mod error;
pub mod extractors;
pub mod google;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod routes;
pub mod service;
pub mod tokens;


pub use error::AuthError;
pub use google::GoogleOAuthClient;
pub use routes::auth_routes;
pub use service::AuthOrchestrator;
pub use tokens::TokenService;
