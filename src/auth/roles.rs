// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role names carried in the `role` claim.
//!
//! Roles are compared exactly (case-sensitive), matching how they take part
//! in key derivation.

/// Granted to every registered account.
pub const USER: &str = "User";

/// Required for destructive catalog operations.
pub const ADMIN: &str = "Admin";

/// Roles for a newly registered account.
pub fn default_roles() -> Vec<String> {
    vec![USER.to_owned()]
}

/// Roles for the seeded administrator.
pub fn admin_roles() -> Vec<String> {
    vec![ADMIN.to_owned(), USER.to_owned()]
}
