use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// Extracts the authenticated user's ID from request extensions.
///
/// This extractor is intended to be used on routes protected by `AuthMiddleware`,
/// which is responsible for validating the JWT and inserting the user's ID into
/// request extensions.
///
/// If the user ID is not found in the extensions, this extractor returns
/// `AppError::Forbidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub i64);

impl AuthenticatedUserId {
    /// Fails with `Forbidden` unless the caller is `target`.
    pub fn ensure_is(self, target: i64) -> Result<i64, AppError> {
        if self.0 == target {
            Ok(target)
        } else {
            Err(AppError::Forbidden(format!(
                "user {} may not access user {}",
                self.0, target
            )))
        }
    }
}

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            None => {
                let err = AppError::Forbidden("no authenticated user for this request".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
