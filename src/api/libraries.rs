// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{JsonBody, PathParam};
use crate::{
    auth::AdminOnly,
    error::{ApiError, ErrorResponse},
    models::{ApiResponse, CreateLibraryRequest, Library, UpdateLibraryRequest, Validate},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/v2/Library/GetAllLibraries",
    tag = "Library",
    security(("bearer" = [])),
    responses((status = 200, body = ApiResponse<Vec<Library>>))
)]
pub async fn list_libraries(State(state): State<AppState>) -> Json<ApiResponse<Vec<Library>>> {
    let store = state.store.read().await;
    Json(ApiResponse::fetched(store.list_libraries()))
}

#[utoipa::path(
    get,
    path = "/api/v2/Library/GetLibraryById/{id}",
    params(("id" = Uuid, Path, description = "Library id")),
    tag = "Library",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Library>),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_library(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Library>>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(ApiResponse::fetched(store.library(id)?)))
}

/// `userId` must name a registered account.
#[utoipa::path(
    post,
    path = "/api/v2/Library/CreateLibrary",
    request_body = CreateLibraryRequest,
    tag = "Library",
    security(("bearer" = [])),
    responses(
        (status = 201, body = ApiResponse<Library>),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn create_library(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateLibraryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Library>>), ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    if state
        .identity
        .store()
        .find_by_id(request.user_id.trim())
        .is_none()
    {
        return Err(ApiError::bad_request("User does not exist."));
    }

    let mut store = state.store.write().await;
    let library = store.create_library(request);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(library, "Library created successfully.")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v2/Library/UpdateLibrary/{id}",
    params(("id" = Uuid, Path, description = "Library id; must match the body")),
    request_body = UpdateLibraryRequest,
    tag = "Library",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Library>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_library(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateLibraryRequest>,
) -> Result<Json<ApiResponse<Library>>, ApiError> {
    if id != request.id {
        return Err(ApiError::bad_request("Mismatched ID."));
    }
    request.validate().map_err(ApiError::bad_request)?;

    let mut store = state.store.write().await;
    let library = store.update_library(request)?;
    Ok(Json(ApiResponse::ok(library, "Library updated successfully.")))
}

/// Requires the `Admin` role.
#[utoipa::path(
    delete,
    path = "/api/v2/Library/DeleteId/{id}",
    params(("id" = Uuid, Path, description = "Library id")),
    tag = "Library",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<bool>),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    )
)]
pub async fn delete_library(
    AdminOnly(admin): AdminOnly,
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let mut store = state.store.write().await;
    store.delete_library(id)?;
    tracing::info!(library_id = %id, deleted_by = %admin.subject_id, "library deleted");
    Ok(Json(ApiResponse::ok(true, "Library deleted successfully.")))
}
