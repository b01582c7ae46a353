//! # Users Module
//!
//! The user directory the auth flows resolve identities against. The auth
//! module only reads records and upserts them by email; everything else
//! about a user's lifecycle belongs here.

pub mod directory;
pub mod models;

#[cfg(test)]
mod tests;

pub use directory::{DirectoryError, SqliteUserDirectory, UserDirectory};
pub use models::{User, UserAttrs};
