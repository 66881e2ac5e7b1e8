// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request gate and fault boundary.
//!
//! The gate runs for every routed request. Routes registered as anonymous
//! pass straight through; everything else needs a valid bearer token, and
//! the resulting [`Principal`] is inserted into the request extensions for
//! handlers to pick up with [`super::Auth`].
//!
//! ```rust,ignore
//! let gate = RequestGate::new(validator).allow_anonymous("/api/v2/User/LoginUser");
//!
//! let api = Router::new()
//!     .route("/api/v2/User/LoginUser", post(login))
//!     .route("/api/v2/Authors/GetAllAuthors", get(list_authors))
//!     .route_layer(axum::middleware::from_fn_with_state(gate, request_gate));
//! ```

use std::{any::Any, collections::HashSet, sync::Arc};

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::catch_panic::CatchPanicLayer;

use super::{AuthError, Principal, TokenValidator};
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};

/// State for [`request_gate`].
#[derive(Clone)]
pub struct RequestGate {
    validator: Arc<TokenValidator>,
    anonymous: Arc<HashSet<String>>,
}

impl RequestGate {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self {
            validator,
            anonymous: Arc::default(),
        }
    }

    /// Mark a route template (as registered on the router) as not requiring
    /// authentication.
    pub fn allow_anonymous(mut self, route: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.anonymous).insert(route.into());
        self
    }

    fn is_anonymous(&self, request: &Request) -> bool {
        request
            .extensions()
            .get::<MatchedPath>()
            .is_some_and(|matched| self.anonymous.contains(matched.as_str()))
    }

    /// Authenticate a request from its headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let token = bearer_token(headers)?;
        self.validator.validate(token)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::TokenMissing)?
        .to_str()
        .map_err(|_| AuthError::BearerSchemeMissing)?
        .trim();

    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::BearerSchemeMissing);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::TokenMissing);
    }
    Ok(token)
}

/// Authentication middleware function.
pub async fn request_gate(
    State(gate): State<RequestGate>,
    mut request: Request,
    next: Next,
) -> Response {
    if gate.is_anonymous(&request) {
        return next.run(request).await;
    }

    match gate.authenticate(request.headers()) {
        Ok(principal) => {
            tracing::debug!(subject_id = %principal.subject_id, "request authenticated");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(
                reason = err.reason(),
                method = %request.method(),
                path = %request.uri().path(),
                "request rejected"
            );
            err.into_response()
        }
    }
}

/// Outermost fault boundary: a panic anywhere below becomes a generic 500.
pub fn fault_boundary() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(render_panic as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn render_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    tracing::error!(panic = %detail, "unhandled fault while processing request");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE).into_response()
}
