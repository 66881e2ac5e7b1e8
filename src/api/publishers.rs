// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{JsonBody, PathParam};
use crate::{
    auth::AdminOnly,
    error::{ApiError, ErrorResponse},
    models::{ApiResponse, CreatePublisherRequest, Publisher, UpdatePublisherRequest, Validate},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/v2/Publishers/GetAllPublishers",
    tag = "Publishers",
    security(("bearer" = [])),
    responses((status = 200, body = ApiResponse<Vec<Publisher>>))
)]
pub async fn list_publishers(State(state): State<AppState>) -> Json<ApiResponse<Vec<Publisher>>> {
    let store = state.store.read().await;
    Json(ApiResponse::fetched(store.list_publishers()))
}

#[utoipa::path(
    get,
    path = "/api/v2/Publishers/GetPublisherById/{id}",
    params(("id" = i32, Path, description = "Publisher id")),
    tag = "Publishers",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Publisher>),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_publisher(
    PathParam(id): PathParam<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Publisher>>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(ApiResponse::fetched(store.publisher(id)?)))
}

#[utoipa::path(
    post,
    path = "/api/v2/Publishers/CreatePublisher",
    request_body = CreatePublisherRequest,
    tag = "Publishers",
    security(("bearer" = [])),
    responses(
        (status = 201, body = ApiResponse<Publisher>),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn create_publisher(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreatePublisherRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Publisher>>), ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    let mut store = state.store.write().await;
    let publisher = store.create_publisher(request);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(publisher, "Publisher created successfully.")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v2/Publishers/UpdatePublisher/{id}",
    params(("id" = i32, Path, description = "Publisher id; must match the body")),
    request_body = UpdatePublisherRequest,
    tag = "Publishers",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Publisher>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_publisher(
    PathParam(id): PathParam<i32>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdatePublisherRequest>,
) -> Result<Json<ApiResponse<Publisher>>, ApiError> {
    if id != request.id {
        return Err(ApiError::bad_request("Mismatched ID."));
    }
    request.validate().map_err(ApiError::bad_request)?;

    let mut store = state.store.write().await;
    let publisher = store.update_publisher(request)?;
    Ok(Json(ApiResponse::ok(publisher, "Publisher updated successfully.")))
}

/// Requires the `Admin` role.
#[utoipa::path(
    delete,
    path = "/api/v2/Publishers/DeletePublisher/{id}",
    params(("id" = i32, Path, description = "Publisher id")),
    tag = "Publishers",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<bool>),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    )
)]
pub async fn delete_publisher(
    AdminOnly(admin): AdminOnly,
    PathParam(id): PathParam<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let mut store = state.store.write().await;
    store.delete_publisher(id)?;
    tracing::info!(publisher_id = id, deleted_by = %admin.subject_id, "publisher deleted");
    Ok(Json(ApiResponse::ok(true, "Publisher deleted successfully.")))
}
