// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints: login and registration (anonymous) and the current
//! principal (authenticated).

use axum::{extract::State, http::StatusCode, Json};

use super::JsonBody;
use crate::{
    auth::{roles, Auth, Principal},
    error::{ApiError, ErrorResponse},
    identity::NewAccount,
    models::{ApiResponse, LoginRequest, LoginResponse, RegisterRequest, Validate},
    state::AppState,
};

/// Log in and receive a bearer token.
#[utoipa::path(
    post,
    path = "/api/v2/User/LoginUser",
    request_body = LoginRequest,
    tag = "User",
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials or account locked", body = ErrorResponse),
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    let identity = state.identity.clone();
    let account = tokio::task::spawn_blocking(move || {
        identity.login(&request.username, &request.password)
    })
    .await
    .map_err(ApiError::internal)??;

    let issued = state
        .issuer
        .issue(&account.id, &account.roles, &account.email)
        .map_err(ApiError::internal)?;

    tracing::info!(user_id = %account.id, "login succeeded");
    Ok(Json(ApiResponse::ok(
        LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
        },
        "Login successful.",
    )))
}

/// Register a new account with the `User` role. Returns the new account id.
#[utoipa::path(
    post,
    path = "/api/v2/User/RegisterUser",
    request_body = RegisterRequest,
    tag = "User",
    responses(
        (status = 201, description = "Account created", body = ApiResponse<String>),
        (status = 400, description = "Validation failed or already registered", body = ErrorResponse),
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    let identity = state.identity.clone();
    let account = tokio::task::spawn_blocking(move || {
        identity.register(NewAccount {
            username: request.username,
            email: request.email,
            password: request.password,
            roles: roles::default_roles(),
        })
    })
    .await
    .map_err(ApiError::internal)??;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(account.id, "Register successful.")),
    ))
}

/// The authenticated principal behind the presented token.
#[utoipa::path(
    get,
    path = "/api/v2/User/Me",
    tag = "User",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current principal", body = ApiResponse<Principal>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    )
)]
pub async fn me(Auth(principal): Auth) -> Json<ApiResponse<Principal>> {
    Json(ApiResponse::fetched(principal))
}
