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
    models::{ApiResponse, Book, CreateBookRequest, UpdateBookRequest, Validate},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/v2/Books/GetAllBooks",
    tag = "Books",
    security(("bearer" = [])),
    responses((status = 200, body = ApiResponse<Vec<Book>>))
)]
pub async fn list_books(State(state): State<AppState>) -> Json<ApiResponse<Vec<Book>>> {
    let store = state.store.read().await;
    Json(ApiResponse::fetched(store.list_books()))
}

#[utoipa::path(
    get,
    path = "/api/v2/Books/GetBookById/{id}",
    params(("id" = i32, Path, description = "Book id")),
    tag = "Books",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Book>),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_book(
    PathParam(id): PathParam<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Book>>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(ApiResponse::fetched(store.book(id)?)))
}

/// Author, publisher and library must already exist.
#[utoipa::path(
    post,
    path = "/api/v2/Books/CreateBook",
    request_body = CreateBookRequest,
    tag = "Books",
    security(("bearer" = [])),
    responses(
        (status = 201, body = ApiResponse<Book>),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateBookRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Book>>), ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    let mut store = state.store.write().await;
    let book = store.create_book(request)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(book, "Book created successfully.")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v2/Books/UpdateBook/{id}",
    params(("id" = i32, Path, description = "Book id; must match the body")),
    request_body = UpdateBookRequest,
    tag = "Books",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Book>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_book(
    PathParam(id): PathParam<i32>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateBookRequest>,
) -> Result<Json<ApiResponse<Book>>, ApiError> {
    if id != request.id {
        return Err(ApiError::bad_request("Mismatched ID."));
    }
    request.validate().map_err(ApiError::bad_request)?;

    let mut store = state.store.write().await;
    let book = store.update_book(request.into())?;
    Ok(Json(ApiResponse::ok(book, "Book updated successfully.")))
}

/// Requires the `Admin` role.
#[utoipa::path(
    delete,
    path = "/api/v2/Books/DeleteBook/{id}",
    params(("id" = i32, Path, description = "Book id")),
    tag = "Books",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<bool>),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn delete_book(
    AdminOnly(admin): AdminOnly,
    PathParam(id): PathParam<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let mut store = state.store.write().await;
    store.delete_book(id)?;
    tracing::info!(book_id = id, deleted_by = %admin.subject_id, "book deleted");
    Ok(Json(ApiResponse::ok(true, "Book deleted successfully.")))
}
