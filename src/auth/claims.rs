// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims, the unverified claim assertion, and the authenticated
//! principal.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{normalize_claim, normalize_roles, AuthError};

/// Claims written into every issued token.
///
/// `role` is emitted in canonical order; verifiers do not depend on that
/// order, but it keeps tokens byte-stable for a given claim set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub role: Vec<String>,
    pub iss: String,
    pub aud: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Not before timestamp
    pub nbf: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Token ID
    pub jti: String,
}

/// A claim that may carry a single string or a list of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Identity claims as they appear on the wire. Each logical claim has a
/// primary short name and a secondary long-form name used by some issuers.
#[derive(Debug, Deserialize)]
struct WireClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    nameid: Option<String>,
    #[serde(default, rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier")]
    name_identifier: Option<String>,

    #[serde(default)]
    email: Option<String>,
    #[serde(default, rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress")]
    email_address: Option<String>,

    #[serde(default)]
    role: Option<OneOrMany>,
    #[serde(default)]
    roles: Option<OneOrMany>,
    #[serde(default, rename = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role")]
    role_uri: Option<OneOrMany>,
}

fn first_present(candidates: [Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find_map(|value| normalize_claim(&value))
}

/// Identity claims read from a token whose signature has not been checked.
///
/// Only [`super::TokenValidator`] should turn this into a [`Principal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimAssertion {
    pub subject_id: String,
    pub email: String,
    pub roles: BTreeSet<String>,
}

impl ClaimAssertion {
    /// Decode the token payload (no signature check) and pull out subject,
    /// email and roles.
    pub fn extract(token: &str) -> Result<Self, AuthError> {
        let wire = jsonwebtoken::dangerous::insecure_decode::<WireClaims>(token)
            .map_err(|_| AuthError::MalformedToken)?
            .claims;

        let subject_id = first_present([wire.sub, wire.nameid, wire.name_identifier]);
        let email = first_present([wire.email, wire.email_address, None]);
        let roles = normalize_roles(
            [wire.role, wire.roles, wire.role_uri]
                .into_iter()
                .flatten()
                .flat_map(OneOrMany::into_vec),
        );

        match (subject_id, email) {
            (Some(subject_id), Some(email)) if !roles.is_empty() => Ok(Self {
                subject_id,
                email,
                roles,
            }),
            _ => Err(AuthError::MissingClaims),
        }
    }
}

/// The authenticated identity attached to a request.
///
/// Only produced by [`super::TokenValidator`] after every check passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub subject_id: String,
    pub email: String,
    pub roles: BTreeSet<String>,
    pub expires_at: DateTime<Utc>,
}

impl Principal {
    pub(crate) fn from_verified(assertion: ClaimAssertion, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject_id: assertion.subject_id,
            email: assertion.email,
            roles: assertion.roles,
            expires_at,
        }
    }

    /// Check if the principal carries a role (exact match).
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn unsigned_token(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.not_a_signature")
    }

    #[test]
    fn extracts_primary_claims() {
        let token = unsigned_token(serde_json::json!({
            "sub": "u1",
            "email": "a@b.com",
            "role": ["User", "Admin"],
        }));
        let assertion = ClaimAssertion::extract(&token).unwrap();
        assert_eq!(assertion.subject_id, "u1");
        assert_eq!(assertion.email, "a@b.com");
        assert_eq!(
            assertion.roles.iter().map(String::as_str).collect::<Vec<_>>(),
            ["Admin", "User"]
        );
    }

    #[test]
    fn falls_back_to_secondary_claims() {
        let token = unsigned_token(serde_json::json!({
            "nameid": "u7",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress": "x@y.org",
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": "Librarian",
        }));
        let assertion = ClaimAssertion::extract(&token).unwrap();
        assert_eq!(assertion.subject_id, "u7");
        assert_eq!(assertion.email, "x@y.org");
        assert!(assertion.roles.contains("Librarian"));
    }

    #[test]
    fn primary_subject_wins_over_secondary() {
        let token = unsigned_token(serde_json::json!({
            "sub": "primary",
            "nameid": "secondary",
            "email": "a@b.com",
            "role": "User",
        }));
        assert_eq!(ClaimAssertion::extract(&token).unwrap().subject_id, "primary");
    }

    #[test]
    fn blank_primary_subject_falls_back() {
        let token = unsigned_token(serde_json::json!({
            "sub": "  ",
            "nameid": "u2",
            "email": "a@b.com",
            "role": "User",
        }));
        assert_eq!(ClaimAssertion::extract(&token).unwrap().subject_id, "u2");
    }

    #[test]
    fn role_claims_are_merged() {
        let token = unsigned_token(serde_json::json!({
            "sub": "u1",
            "email": "a@b.com",
            "role": "User",
            "roles": ["Admin", "User"],
        }));
        let assertion = ClaimAssertion::extract(&token).unwrap();
        assert_eq!(assertion.roles.len(), 2);
    }

    #[test]
    fn missing_any_identity_claim_is_rejected() {
        let no_roles = unsigned_token(serde_json::json!({"sub": "u1", "email": "a@b.com"}));
        let empty_roles =
            unsigned_token(serde_json::json!({"sub": "u1", "email": "a@b.com", "role": []}));
        let no_email = unsigned_token(serde_json::json!({"sub": "u1", "role": "User"}));
        let no_subject = unsigned_token(serde_json::json!({"email": "a@b.com", "role": "User"}));

        for token in [no_roles, empty_roles, no_email, no_subject] {
            assert_eq!(ClaimAssertion::extract(&token), Err(AuthError::MissingClaims));
        }
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            ClaimAssertion::extract("definitely-not-a-jwt"),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn has_role_is_exact() {
        let principal = Principal::from_verified(
            ClaimAssertion {
                subject_id: "u1".into(),
                email: "a@b.com".into(),
                roles: ["Admin".to_string()].into(),
            },
            Utc::now(),
        );
        assert!(principal.has_role("Admin"));
        assert!(!principal.has_role("admin"));
    }
}
