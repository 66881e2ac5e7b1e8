// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Claim-bound bearer tokens. Every token is signed with a key derived from
//! its own subject, roles and email plus a server-side shared secret, so a
//! token whose identity claims were edited no longer verifies.
//!
//! ## Auth Flow
//!
//! 1. Client logs in and receives a token from [`TokenIssuer`]
//! 2. Client sends `Authorization: Bearer <token>`
//! 3. [`request_gate`]:
//!    - reads subject, email and roles from the unverified payload
//!    - derives the per-principal key with [`derive_key`]
//!    - verifies signature, expiry, not-before, issuer, audience
//!    - attaches the [`Principal`] to the request
//!
//! ## Security
//!
//! - All routes except login, registration, health and docs require a token
//! - Every rejection is a generic 401; the reason is only logged
//! - Clock skew tolerance defaults to 60 seconds
//! - Derived keys are recomputed per request and never cached

pub mod claims;
pub mod error;
pub mod extractor;
pub mod issuer;
pub mod kdf;
pub mod middleware;
pub mod roles;
pub mod validator;

pub use claims::{ClaimAssertion, Principal, TokenClaims};
pub use error::{AuthError, UNAUTHORIZED_MESSAGE};
pub use extractor::{AdminOnly, Auth};
pub use issuer::{IssueError, IssuedToken, TokenIssuer};
pub use kdf::{
    canonical_roles, derive_key, normalize_claim, normalize_roles, DerivedKey, SharedSecret,
    DERIVED_KEY_LEN,
};
pub use middleware::{bearer_token, fault_boundary, request_gate, RequestGate};
pub use validator::{TokenValidationResult, TokenValidator};
