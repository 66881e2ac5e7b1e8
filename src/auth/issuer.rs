// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance.
//!
//! Issued tokens are HS256-signed with the key derived from their own
//! subject, roles and email, so they are verifiable only by
//! [`super::TokenValidator`] with the same shared secret.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{derive_key, normalize_claim, normalize_roles, TokenClaims};
use crate::config::AuthSettings;

/// A freshly signed token.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Why a token could not be issued.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Subject, email or every role was blank; such a token could never
    /// validate.
    #[error("subject, email and at least one role are required")]
    MissingClaims,
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenIssuer {
    settings: Arc<AuthSettings>,
}

impl TokenIssuer {
    pub fn new(settings: Arc<AuthSettings>) -> Self {
        Self { settings }
    }

    pub fn issue<I>(&self, subject_id: &str, roles: I, email: &str) -> Result<IssuedToken, IssueError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.issue_at(subject_id, roles, email, Utc::now())
    }

    /// Issue a token as if it were signed at `issued_at`.
    ///
    /// Claims are normalized the same way the validator reads them back.
    pub fn issue_at<I>(
        &self,
        subject_id: &str,
        roles: I,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, IssueError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let roles = normalize_roles(roles);
        let (Some(subject_id), Some(email)) = (normalize_claim(subject_id), normalize_claim(email))
        else {
            return Err(IssueError::MissingClaims);
        };
        if roles.is_empty() {
            return Err(IssueError::MissingClaims);
        }

        let expires_at = issued_at + self.settings.token_lifetime;
        let key = derive_key(&subject_id, &roles, &email, &self.settings.secret);

        let claims = TokenClaims {
            sub: subject_id,
            email,
            role: roles.into_iter().collect(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )?;

        Ok(IssuedToken { token, expires_at })
    }
}
