// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User accounts, password checks and lockout.
//!
//! Passwords are stored as Argon2id PHC strings. Usernames and emails are
//! matched case-insensitively and must be unique.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use rand_core::OsRng;
use thiserror::Error;
use uuid::Uuid;

/// Account lockout after repeated failed logins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_failed_attempts: u32,
    pub lockout_duration: Duration,
    /// Whether accounts created from now on are subject to lockout.
    pub allowed_for_new_users: bool,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(60),
            allowed_for_new_users: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub lockout_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    fn locked_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.locked_until
            .filter(|until| self.lockout_enabled && *until > now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Invalid username.")]
    UnknownUser,
    #[error("Invalid password.")]
    WrongPassword,
    #[error("Account locked. Try again after {minutes} minutes.")]
    LockedOut { minutes: i64 },
    #[error("Username is already registered.")]
    DuplicateUsername,
    #[error("Email is already registered.")]
    DuplicateEmail,
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

/// Storage for user accounts.
///
/// Implementations must make `insert` atomic with respect to the uniqueness
/// checks.
pub trait IdentityStore: Send + Sync {
    fn find_by_name(&self, username: &str) -> Option<UserAccount>;
    fn find_by_email(&self, email: &str) -> Option<UserAccount>;
    fn find_by_id(&self, id: &str) -> Option<UserAccount>;
    fn insert(&self, account: UserAccount) -> Result<(), IdentityError>;
    /// Count a failed password check. Returns the lockout end if this
    /// failure locked the account.
    fn record_login_failure(
        &self,
        id: &str,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>>;
    fn record_login_success(&self, id: &str);
}

#[derive(Default)]
pub struct InMemoryIdentityStore {
    accounts: RwLock<HashMap<String, UserAccount>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_by(&self, matches: impl Fn(&UserAccount) -> bool) -> Option<UserAccount> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|account| matches(account))
            .cloned()
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn find_by_name(&self, username: &str) -> Option<UserAccount> {
        self.find_by(|account| account.username.eq_ignore_ascii_case(username))
    }

    fn find_by_email(&self, email: &str) -> Option<UserAccount> {
        self.find_by(|account| account.email.eq_ignore_ascii_case(email))
    }

    fn find_by_id(&self, id: &str) -> Option<UserAccount> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn insert(&self, account: UserAccount) -> Result<(), IdentityError> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);

        if accounts
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(IdentityError::DuplicateEmail);
        }
        if accounts
            .values()
            .any(|a| a.username.eq_ignore_ascii_case(&account.username))
        {
            return Err(IdentityError::DuplicateUsername);
        }

        accounts.insert(account.id.clone(), account);
        Ok(())
    }

    fn record_login_failure(
        &self,
        id: &str,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        let account = accounts.get_mut(id)?;
        if !account.lockout_enabled {
            return None;
        }

        account.failed_attempts += 1;
        if account.failed_attempts < policy.max_failed_attempts {
            return None;
        }

        let until = now + policy.lockout_duration;
        account.failed_attempts = 0;
        account.locked_until = Some(until);
        Some(until)
    }

    fn record_login_success(&self, id: &str) {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(account) = accounts.get_mut(id) {
            account.failed_attempts = 0;
            account.locked_until = None;
        }
    }
}

/// Details for a new account. Field validation happens before this point.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
}

/// Registration and login on top of an [`IdentityStore`].
///
/// Password hashing is CPU bound; async callers should run these methods on
/// a blocking thread.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn IdentityStore>,
    lockout: LockoutPolicy,
}

impl IdentityService {
    pub fn new(store: Arc<dyn IdentityStore>, lockout: LockoutPolicy) -> Self {
        Self { store, lockout }
    }

    pub fn store(&self) -> &dyn IdentityStore {
        self.store.as_ref()
    }

    pub fn register(&self, new: NewAccount) -> Result<UserAccount, IdentityError> {
        let email = new.email.trim().to_owned();
        let username = new.username.trim().to_owned();

        // Cheap checks first; insert re-checks under the write lock.
        if self.store.find_by_email(&email).is_some() {
            return Err(IdentityError::DuplicateEmail);
        }
        if self.store.find_by_name(&username).is_some() {
            return Err(IdentityError::DuplicateUsername);
        }

        let account = UserAccount {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash: hash_password(&new.password)?,
            roles: new.roles,
            failed_attempts: 0,
            locked_until: None,
            lockout_enabled: self.lockout.allowed_for_new_users,
            created_at: Utc::now(),
        };
        self.store.insert(account.clone())?;

        tracing::info!(user_id = %account.id, "account registered");
        Ok(account)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<UserAccount, IdentityError> {
        self.login_at(username, password, Utc::now())
    }

    pub fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<UserAccount, IdentityError> {
        let account = self
            .store
            .find_by_name(username.trim())
            .ok_or(IdentityError::UnknownUser)?;

        if let Some(until) = account.locked_at(now) {
            return Err(locked_out(until, now));
        }

        if !verify_password(password, &account.password_hash) {
            tracing::warn!(user_id = %account.id, "failed login attempt");
            if let Some(until) = self.store.record_login_failure(&account.id, &self.lockout, now) {
                tracing::warn!(user_id = %account.id, %until, "account locked out");
                return Err(locked_out(until, now));
            }
            return Err(IdentityError::WrongPassword);
        }

        self.store.record_login_success(&account.id);
        Ok(account)
    }
}

fn locked_out(until: DateTime<Utc>, now: DateTime<Utc>) -> IdentityError {
    let remaining = until - now;
    // Round partial minutes up so "0 minutes" is never shown.
    let minutes = (remaining.num_seconds() + 59) / 60;
    IdentityError::LockedOut {
        minutes: minutes.max(1),
    }
}

pub fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| IdentityError::PasswordHash(err.to_string()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
