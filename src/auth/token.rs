use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The authenticated user's identifier.
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
///
/// Constructed once from [`Config`] and shared with the authorization
/// middleware and the login/registration handlers.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime_hours: u32) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime: Duration::hours(i64::from(lifetime_hours)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expiration_hours)
    }

    /// Generates a token for `user_id` that expires after the configured lifetime.
    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AppError::Internal("token expiry overflows".into()))?;
        self.issue_until(user_id, expires_at)
    }

    /// Generates a token for `user_id` with an explicit expiry.
    pub fn issue_until(&self, user_id: i64, expires_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            user_id,
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature, algorithm and expiry, returning the embedded user id.
    ///
    /// Returns `AppError::InvalidToken` if the token is malformed, signed with
    /// another algorithm or key, or has expired.
    pub fn verify(&self, token: &str) -> Result<i64, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims.user_id)
    }
}
