pub mod crypto;
pub mod extractors;
pub mod middleware;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

// Re-export necessary items
pub use crypto::{CryptoError, PasswordCipher};
pub use extractors::AuthenticatedUserId;
pub use middleware::{ActiveUserGuard, AuthMiddleware};
pub use token::{Claims, TokenService};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    /// Must be a valid email format.
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    /// User's password.
    /// Must be between 8 and 130 characters long.
    #[validate(length(min = 8, max = 130, message = "password must be 8 to 130 characters"))]
    pub password: String,
}

/// Response structure after successful authentication (login or registration).
/// Contains the JWT access token and the authenticated user.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The JWT (JSON Web Token) for session authentication.
    pub token: String,
    pub user: User,
}
