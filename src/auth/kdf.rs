// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-principal signing key derivation.
//!
//! The key that signs (and verifies) a token is not the shared secret itself
//! but an HMAC-SHA-256 digest, keyed by the secret, over the token's own
//! identity claims:
//!
//! ```text
//! subject_id "|" join(sorted(roles), ",") "|" email
//! ```
//!
//! Changing any of those claims after issuance changes the derived key, so
//! the original signature no longer verifies. Issuance and validation both
//! go through [`derive_key`], which keeps role canonicalization identical on
//! both sides.

use std::{collections::BTreeSet, fmt, sync::Arc};

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::ConfigError;

type HmacSha256 = Hmac<Sha256>;

/// Length of a derived key in bytes (HMAC-SHA-256 output).
pub const DERIVED_KEY_LEN: usize = 32;

/// The process-wide shared secret.
///
/// Only constructible from a non-blank value, so a misconfigured secret is
/// caught at startup instead of on the first request.
#[derive(Clone)]
pub struct SharedSecret(Arc<[u8]>);

impl SharedSecret {
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let bytes = bytes.as_ref();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ConfigError::DerivationMisconfigured);
        }
        Ok(Self(Arc::from(bytes)))
    }

    fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// A key derived for exactly one token's claim set.
///
/// Deliberately neither `Clone` nor `Serialize`; it lives for one validation.
pub struct DerivedKey([u8; DERIVED_KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

/// A claim value as it takes part in derivation: trimmed, `None` when blank.
pub fn normalize_claim(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Trimmed, non-blank roles in ordinal ascending order with duplicates
/// collapsed.
pub fn normalize_roles<I>(roles: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    roles
        .into_iter()
        .filter_map(|role| normalize_claim(role.as_ref()))
        .collect()
}

/// Canonical role encoding: [`normalize_roles`] joined with `,`.
pub fn canonical_roles<I>(roles: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    normalize_roles(roles)
        .into_iter()
        .collect::<Vec<_>>()
        .join(",")
}

/// Derive the signing key for a claim set.
///
/// Subject and email are trimmed and roles normalized, so issuance and
/// validation derive from the same bytes.
pub fn derive_key<I>(subject_id: &str, roles: I, email: &str, secret: &SharedSecret) -> DerivedKey
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let message = format!(
        "{}|{}|{}",
        subject_id.trim(),
        canonical_roles(roles),
        email.trim()
    );

    let mut mac =
        HmacSha256::new_from_slice(secret.expose()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());

    let mut key = [0u8; DERIVED_KEY_LEN];
    key.copy_from_slice(&mac.finalize().into_bytes());
    DerivedKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SharedSecret {
        SharedSecret::new("ThisIsAStrongSecretKey12345").unwrap()
    }

    #[test]
    fn padding_and_blank_roles_do_not_change_the_key() {
        let plain = derive_key("u1", ["Admin", "User"], "a@b.com", &secret());
        let padded = derive_key(" u1", [" Admin", "User ", "", "  "], "a@b.com ", &secret());
        assert_eq!(plain.as_bytes(), padded.as_bytes());
    }

    #[test]
    fn normalize_roles_drops_blanks_and_duplicates() {
        let roles = normalize_roles(["User", " Admin ", "", "User"]);
        assert_eq!(roles.into_iter().collect::<Vec<_>>(), ["Admin", "User"]);
        assert_eq!(normalize_claim("   "), None);
        assert_eq!(normalize_claim(" a@b.com "), Some("a@b.com".to_string()));
    }

    #[test]
    fn role_order_does_not_change_the_key() {
        let a = derive_key("u1", ["Admin", "User"], "a@b.com", &secret());
        let b = derive_key("u1", ["User", "Admin"], "a@b.com", &secret());
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn role_membership_changes_the_key() {
        let both = derive_key("u1", ["Admin", "User"], "a@b.com", &secret());
        let user_only = derive_key("u1", ["User"], "a@b.com", &secret());
        let extra = derive_key("u1", ["Admin", "Auditor", "User"], "a@b.com", &secret());
        assert_ne!(both.as_bytes(), user_only.as_bytes());
        assert_ne!(both.as_bytes(), extra.as_bytes());
    }

    #[test]
    fn subject_email_and_secret_all_bind_the_key() {
        let base = derive_key("u1", ["User"], "a@b.com", &secret());
        let other_subject = derive_key("u2", ["User"], "a@b.com", &secret());
        let other_email = derive_key("u1", ["User"], "x@b.com", &secret());
        let other_secret = derive_key(
            "u1",
            ["User"],
            "a@b.com",
            &SharedSecret::new("another-secret").unwrap(),
        );
        assert_ne!(base.as_bytes(), other_subject.as_bytes());
        assert_ne!(base.as_bytes(), other_email.as_bytes());
        assert_ne!(base.as_bytes(), other_secret.as_bytes());
    }

    #[test]
    fn key_is_hmac_over_canonical_message() {
        let mut mac = HmacSha256::new_from_slice(b"ThisIsAStrongSecretKey12345").unwrap();
        mac.update(b"u1|Admin,User|a@b.com");
        let expected = mac.finalize().into_bytes();

        let derived = derive_key("u1", ["User", "Admin"], "a@b.com", &secret());
        assert_eq!(derived.as_bytes(), expected.as_slice());
        assert_eq!(derived.as_bytes().len(), DERIVED_KEY_LEN);
    }

    #[test]
    fn canonical_roles_sorts_ordinally_and_dedups() {
        assert_eq!(canonical_roles(["user", "Admin", "User", "Admin"]), "Admin,User,user");
        assert_eq!(canonical_roles(Vec::<String>::new()), "");
    }

    #[test]
    fn blank_secret_is_rejected() {
        assert!(matches!(
            SharedSecret::new(""),
            Err(ConfigError::DerivationMisconfigured)
        ));
        assert!(matches!(
            SharedSecret::new(" \t"),
            Err(ConfigError::DerivationMisconfigured)
        ));
    }

    #[test]
    fn debug_output_never_contains_key_material() {
        let secret = secret();
        assert_eq!(format!("{secret:?}"), "SharedSecret(<redacted>)");
        let key = derive_key("u1", ["User"], "a@b.com", &secret);
        assert_eq!(format!("{key:?}"), "DerivedKey(<redacted>)");
    }
}
