//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every handler, extractor and middleware failure ends up here, and `AppError` is the
//! single place where an error is turned into an HTTP response.
//!
//! All error responses share one JSON shape, `{"statusCode": <u16>, "msg": <string>}`.
//! Only the client-facing kinds carry their message to the caller; storage, crypto and
//! other internal failures are logged in full and answered with a generic message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::crypto::CryptoError;

/// Message returned to the client for every internal failure.
pub const INTERNAL_ERROR_MSG: &str = "internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed JSON or a payload that failed validation (HTTP 400).
    #[error("invalid request data: {0}")]
    InvalidRequestData(String),
    /// A uniqueness constraint would be violated, e.g. a taken email (HTTP 400).
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Missing entity, or a failed login (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),
    /// The caller identity is missing, stale, or does not own the target (HTTP 403).
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// No usable bearer token was presented (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// A bearer token failed signature, algorithm or expiry checks (HTTP 401).
    #[error("invalid token: {0}")]
    InvalidToken(String),
    /// Wraps errors from the `sqlx` crate (HTTP 500).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Password encryption or decryption failed (HTTP 500).
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
    /// Any other unexpected server-side error (HTTP 500).
    #[error("internal server error: {0}")]
    Internal(String),
}

/// The uniform JSON body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub msg: String,
}

impl AppError {
    /// Whether this error may expose its message to the client.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AppError::Database(_) | AppError::Crypto(_) | AppError::Internal(_)
        )
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidRequestData(msg)
            | AppError::AlreadyExists(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Unauthorized(msg) => msg.clone(),
            AppError::InvalidToken(_) => "invalid token".to_string(),
            AppError::Database(_) | AppError::Crypto(_) | AppError::Internal(_) => {
                INTERNAL_ERROR_MSG.to_string()
            }
        }
    }

    /// Builds the envelope the client will see for this error.
    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            status_code: self.status_code().as_u16(),
            msg: self.client_message(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequestData(_) | AppError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) | AppError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Crypto(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_client_error() {
            log::warn!("api error: {}", self);
        } else {
            log::error!("internal error: {}", self);
        }
        HttpResponse::build(self.status_code()).json(self.envelope())
    }
}

/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::InvalidRequestData(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::InvalidToken(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn envelope_of(error: AppError) -> (StatusCode, ErrorEnvelope) {
        let response = error.error_response();
        let status = response.status();
        let body = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::InvalidRequestData("bad".into()), 400),
            (AppError::AlreadyExists("taken".into()), 400),
            (AppError::NotFound("missing".into()), 404),
            (AppError::Forbidden("nope".into()), 403),
            (AppError::Unauthorized("Missing token".into()), 401),
            (AppError::InvalidToken("ExpiredSignature".into()), 401),
            (AppError::Internal("boom".into()), 500),
            (AppError::Database(sqlx::Error::PoolTimedOut), 500),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code().as_u16(), expected, "{:?}", error);
        }
    }

    #[actix_web::test]
    async fn test_client_errors_carry_their_message() {
        let (status, body) = envelope_of(AppError::NotFound("invalid password".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            ErrorEnvelope {
                status_code: 404,
                msg: "invalid password".into()
            }
        );
    }

    #[actix_web::test]
    async fn test_internal_errors_hide_details() {
        let (status, body) = envelope_of(AppError::Internal("db password is hunter2".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.status_code, 500);
        assert_eq!(body.msg, INTERNAL_ERROR_MSG);

        let (_, body) = envelope_of(AppError::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(body.msg, INTERNAL_ERROR_MSG);
    }

    #[actix_web::test]
    async fn test_invalid_token_detail_is_not_echoed() {
        let (status, body) = envelope_of(AppError::InvalidToken("InvalidSignature".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.msg, "invalid token");
    }
}
