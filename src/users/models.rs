//! User directory data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Local user record, keyed uniquely by email
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Attributes written on insert-or-update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAttrs {
    pub name: Option<String>,
}
