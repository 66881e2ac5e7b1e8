// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication rejections.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

use crate::error::ApiError;

/// Message returned to callers for every rejection. The precise reason is
/// only written to the log.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized Request.";

/// Why a request failed authentication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token was presented
    #[error("token not provided")]
    TokenMissing,
    /// Authorization header present but not a `Bearer` credential
    #[error("bearer scheme missing from authorization header")]
    BearerSchemeMissing,
    /// Token could not be decoded
    #[error("token is malformed")]
    MalformedToken,
    /// Subject, email or roles absent from the payload
    #[error("token is missing required claims")]
    MissingClaims,
    /// Signature does not verify under the key derived from the claims
    #[error("token signature is invalid")]
    InvalidSignature,
    /// Token has expired
    #[error("token has expired")]
    ExpiredToken,
    /// Token is not valid yet
    #[error("token is not yet valid")]
    TokenNotYetValid,
    /// Token issuer is invalid
    #[error("token issuer is invalid")]
    InvalidIssuer,
    /// Token audience is invalid
    #[error("token audience is invalid")]
    InvalidAudience,
}

impl AuthError {
    /// Stable reason code for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::TokenMissing => "token_missing",
            AuthError::BearerSchemeMissing => "bearer_scheme_missing",
            AuthError::MalformedToken => "malformed_token",
            AuthError::MissingClaims => "missing_claims",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::ExpiredToken => "expired_token",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::InvalidAudience => "invalid_audience",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
            ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
                "iss" => AuthError::InvalidIssuer,
                "aud" => AuthError::InvalidAudience,
                "exp" | "nbf" => AuthError::ExpiredToken,
                _ => AuthError::MissingClaims,
            },
            _ => AuthError::MalformedToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::new(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE).into_response()
    }
}
