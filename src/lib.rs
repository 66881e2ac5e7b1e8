// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Library Service - catalog API behind claim-bound token authentication
//!
//! Every bearer token is signed with a key derived from its own subject,
//! roles and email plus a server-side secret. Editing any identity claim
//! invalidates the signature.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Key derivation, token issuance and validation, request gate
//! - `identity` - User accounts, password hashing and lockout
//! - `store` - In-memory catalog store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod state;
pub mod store;
pub mod telemetry;
