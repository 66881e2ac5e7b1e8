// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{roles, TokenIssuer, TokenValidator};
use crate::config::{AdminSeed, AppConfig, AuthSettings};
use crate::identity::{
    IdentityError, IdentityService, InMemoryIdentityStore, LockoutPolicy, NewAccount,
};
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub identity: IdentityService,
    pub issuer: Arc<TokenIssuer>,
    pub validator: Arc<TokenValidator>,
}

impl AppState {
    pub fn new(auth: Arc<AuthSettings>, lockout: LockoutPolicy) -> Self {
        Self {
            store: Arc::new(RwLock::new(InMemoryStore::new())),
            identity: IdentityService::new(Arc::new(InMemoryIdentityStore::new()), lockout),
            issuer: Arc::new(TokenIssuer::new(auth.clone())),
            validator: Arc::new(TokenValidator::new(auth)),
        }
    }

    /// Build state from configuration, creating the admin account if one is
    /// configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, IdentityError> {
        let state = Self::new(config.auth.clone(), config.lockout);
        if let Some(seed) = &config.admin {
            state.seed_admin(seed)?;
        }
        Ok(state)
    }

    pub fn seed_admin(&self, seed: &AdminSeed) -> Result<(), IdentityError> {
        let account = self.identity.register(NewAccount {
            username: seed.username.clone(),
            email: seed.email.clone(),
            password: seed.password.clone(),
            roles: roles::admin_roles(),
        })?;
        tracing::info!(user_id = %account.id, username = %account.username, "admin account seeded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SharedSecret;

    fn settings() -> Arc<AuthSettings> {
        Arc::new(AuthSettings::new(
            SharedSecret::new("ThisIsAStrongSecretKey12345").unwrap(),
            "TestIssuer",
            "TestAudience",
        ))
    }

    #[test]
    fn seeded_admin_can_log_in_with_admin_role() {
        let state = AppState::new(settings(), LockoutPolicy::default());
        state
            .seed_admin(&AdminSeed {
                username: "Admin123".into(),
                email: "admin@library.com".into(),
                password: "Admin@123".into(),
            })
            .unwrap();

        let account = state.identity.login("Admin123", "Admin@123").unwrap();
        assert!(account.roles.iter().any(|r| r == roles::ADMIN));
    }

    #[test]
    fn issuer_and_validator_share_settings() {
        let state = AppState::new(settings(), LockoutPolicy::default());
        let issued = state.issuer.issue("u1", ["User"], "a@b.com").unwrap();
        assert!(state.validator.validate(&issued.token).is_ok());
    }
}
