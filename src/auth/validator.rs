// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token validation.
//!
//! A token moves through
//! `Received -> ClaimsExtracted -> KeyDerived -> SignatureVerified` and ends
//! either as a [`Principal`] or as an [`AuthError`]. Each step needs the
//! previous step's output, so the order is fixed:
//!
//! 1. reject blank input,
//! 2. read subject, email and roles from the unverified payload,
//! 3. derive the per-principal key from those claims and the shared secret,
//! 4. verify the HS256 signature under the derived key, then `iss`, `aud`
//!    and finally `exp`/`nbf` with the skew window.
//!
//! Nothing is cached between calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::{derive_key, AuthError, ClaimAssertion, Principal};
use crate::config::AuthSettings;

/// Outcome of a single validation.
pub type TokenValidationResult = Result<Principal, AuthError>;

/// Registered claims read back after the signature has been verified.
#[derive(Debug, Deserialize)]
struct VerifiedLifetime {
    exp: i64,
    #[serde(default)]
    nbf: Option<i64>,
}

#[derive(Clone)]
pub struct TokenValidator {
    settings: Arc<AuthSettings>,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(settings: Arc<AuthSettings>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Lifetime is checked after issuer and audience, in `check_lifetime`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Self {
            settings,
            validation,
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Validate a raw compact token.
    pub fn validate(&self, token: &str) -> TokenValidationResult {
        self.validate_at(token, Utc::now())
    }

    /// Validate as of `now`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> TokenValidationResult {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::TokenMissing);
        }

        let assertion = ClaimAssertion::extract(token)?;

        let key = derive_key(
            &assertion.subject_id,
            &assertion.roles,
            &assertion.email,
            &self.settings.secret,
        );

        let verified = decode::<VerifiedLifetime>(
            token,
            &DecodingKey::from_secret(key.as_bytes()),
            &self.validation,
        )?;

        let expires_at = self.check_lifetime(&verified.claims, now)?;

        Ok(Principal::from_verified(assertion, expires_at))
    }

    fn check_lifetime(
        &self,
        lifetime: &VerifiedLifetime,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, AuthError> {
        let expires_at =
            DateTime::<Utc>::from_timestamp(lifetime.exp, 0).ok_or(AuthError::MalformedToken)?;

        let skew = i64::try_from(self.settings.clock_skew_secs).unwrap_or(i64::MAX);
        let now = now.timestamp();

        if lifetime.exp <= now.saturating_sub(skew) {
            return Err(AuthError::ExpiredToken);
        }
        if lifetime.nbf.is_some_and(|nbf| nbf > now.saturating_add(skew)) {
            return Err(AuthError::TokenNotYetValid);
        }
        Ok(expires_at)
    }
}
