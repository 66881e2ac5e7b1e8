// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup and shared read-only for the lifetime of the process.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | Shared secret for per-principal key derivation | Required |
//! | `JWT_ISSUER` | Issued and expected `iss` claim | Required |
//! | `JWT_AUDIENCE` | Issued and expected `aud` claim | Required |
//! | `JWT_CLOCK_SKEW_SECS` | Tolerance applied to `exp`/`nbf` | `60` |
//! | `JWT_TOKEN_LIFETIME_MINUTES` | Lifetime of issued tokens | `30` |
//! | `LOCKOUT_MAX_FAILED_ATTEMPTS` | Failed logins before lockout | `5` |
//! | `LOCKOUT_DURATION_MINUTES` | Lockout length | `60` |
//! | `LOCKOUT_ALLOWED_FOR_NEW_USERS` | Lockout applies to new accounts | `true` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; both set enables HTTPS | unset |
//! | `ADMIN_USERNAME` / `ADMIN_EMAIL` / `ADMIN_PASSWORD` | Seeded admin account; all or none | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{env, path::PathBuf, str::FromStr, sync::Arc};

use chrono::Duration;
use thiserror::Error;

use crate::auth::SharedSecret;
use crate::identity::LockoutPolicy;
use crate::models::{RegisterRequest, Validate};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const JWT_AUDIENCE_ENV: &str = "JWT_AUDIENCE";
pub const JWT_CLOCK_SKEW_ENV: &str = "JWT_CLOCK_SKEW_SECS";
pub const JWT_TOKEN_LIFETIME_ENV: &str = "JWT_TOKEN_LIFETIME_MINUTES";
pub const LOCKOUT_MAX_FAILED_ENV: &str = "LOCKOUT_MAX_FAILED_ATTEMPTS";
pub const LOCKOUT_DURATION_ENV: &str = "LOCKOUT_DURATION_MINUTES";
pub const LOCKOUT_NEW_USERS_ENV: &str = "LOCKOUT_ALLOWED_FOR_NEW_USERS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const ADMIN_USERNAME_ENV: &str = "ADMIN_USERNAME";
pub const ADMIN_EMAIL_ENV: &str = "ADMIN_EMAIL";
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default clock skew tolerance (60 seconds).
pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 60;
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 30;

/// Startup configuration failures. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
    #[error("token secret is empty; per-principal key derivation cannot be configured")]
    DerivationMisconfigured,
    #[error("{TLS_CERT_PATH_ENV} and {TLS_KEY_PATH_ENV} must be set together")]
    IncompleteTls,
    #[error("{ADMIN_USERNAME_ENV}, {ADMIN_EMAIL_ENV} and {ADMIN_PASSWORD_ENV} must be set together")]
    IncompleteAdminSeed,
    #[error("admin account from {ADMIN_USERNAME_ENV}/{ADMIN_EMAIL_ENV}/{ADMIN_PASSWORD_ENV} is invalid: {0}")]
    InvalidAdminSeed(String),
}

/// Immutable settings shared by token issuance and validation.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub secret: SharedSecret,
    pub issuer: String,
    pub audience: String,
    pub clock_skew_secs: u64,
    pub token_lifetime: Duration,
}

impl AuthSettings {
    /// Settings with the default skew window and token lifetime.
    pub fn new(secret: SharedSecret, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            secret,
            issuer: issuer.into(),
            audience: audience.into(),
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            token_lifetime: Duration::minutes(DEFAULT_TOKEN_LIFETIME_MINUTES),
        }
    }

    pub fn with_clock_skew(mut self, seconds: u64) -> Self {
        self.clock_skew_secs = seconds;
        self
    }

    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT` directly; logging is set up before the rest of the
    /// configuration so that configuration errors can be logged.
    pub fn from_env() -> Self {
        match env::var(LOG_FORMAT_ENV) {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Administrator account created at startup.
#[derive(Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AdminSeed {
    /// Apply the registration rules, so the seeded account can log in.
    pub fn validate(&self) -> Result<(), ConfigError> {
        RegisterRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            confirm_password: self.password.clone(),
        }
        .validate()
        .map_err(ConfigError::InvalidAdminSeed)
    }
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Full process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub auth: Arc<AuthSettings>,
    pub lockout: LockoutPolicy,
    pub tls: Option<TlsPaths>,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = required(&lookup, JWT_SECRET_ENV)?;
        let secret = SharedSecret::new(secret.as_bytes())?;

        let auth = AuthSettings::new(
            secret,
            required(&lookup, JWT_ISSUER_ENV)?,
            required(&lookup, JWT_AUDIENCE_ENV)?,
        )
        .with_clock_skew(parsed(&lookup, JWT_CLOCK_SKEW_ENV, DEFAULT_CLOCK_SKEW_SECS)?)
        .with_token_lifetime(Duration::minutes(parsed(
            &lookup,
            JWT_TOKEN_LIFETIME_ENV,
            DEFAULT_TOKEN_LIFETIME_MINUTES,
        )?));

        if auth.token_lifetime <= Duration::zero() {
            return Err(ConfigError::Invalid {
                name: JWT_TOKEN_LIFETIME_ENV,
                value: auth.token_lifetime.num_minutes().to_string(),
            });
        }

        let defaults = LockoutPolicy::default();
        let lockout = LockoutPolicy {
            max_failed_attempts: parsed(&lookup, LOCKOUT_MAX_FAILED_ENV, defaults.max_failed_attempts)?,
            lockout_duration: Duration::minutes(parsed(
                &lookup,
                LOCKOUT_DURATION_ENV,
                defaults.lockout_duration.num_minutes(),
            )?),
            allowed_for_new_users: parsed(
                &lookup,
                LOCKOUT_NEW_USERS_ENV,
                defaults.allowed_for_new_users,
            )?,
        };

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let admin = match (
            lookup(ADMIN_USERNAME_ENV),
            lookup(ADMIN_EMAIL_ENV),
            lookup(ADMIN_PASSWORD_ENV),
        ) {
            (Some(username), Some(email), Some(password)) => Some(AdminSeed {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => return Err(ConfigError::IncompleteAdminSeed),
        };
        if let Some(seed) = &admin {
            seed.validate()?;
        }

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&lookup, PORT_ENV, 8080)?,
            auth: Arc::new(auth),
            lockout,
            tls,
            admin,
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        // An empty secret is a derivation fault rather than a plain omission.
        Some(_) if name == JWT_SECRET_ENV => Err(ConfigError::DerivationMisconfigured),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(_) => Err(ConfigError::Invalid { name, value }),
        },
    }
}
