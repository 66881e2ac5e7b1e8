// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the authenticated principal.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is the verified Principal
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{roles, AuthError, Principal};
use crate::error::ApiError;

/// The principal attached by [`super::request_gate`].
///
/// Rejects with [`AuthError::TokenMissing`] when the route was not behind the
/// gate, so a misrouted handler fails closed.
pub struct Auth(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::TokenMissing)
    }
}

/// Extractor that requires the admin role.
pub struct AdminOnly(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for AdminOnly {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(principal) = Auth::from_request_parts(parts, state).await?;

        if !principal.has_role(roles::ADMIN) {
            tracing::warn!(subject_id = %principal.subject_id, "admin role required");
            return Err(ApiError::forbidden());
        }

        Ok(AdminOnly(principal))
    }
}
