use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A registered account as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Encrypted password blob. Never serialized.
    #[serde(skip)]
    pub password: String,
    pub joined_at: DateTime<Utc>,
}

/// Payload for registration and for updating an existing account.
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, max = 130, message = "password must be 8 to 130 characters"))]
    pub password: String, // plaintext; encrypted before it reaches the store
}

/// Column values for inserting or updating a user. `password` is already encrypted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}
