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
    models::{ApiResponse, Author, CreateAuthorRequest, UpdateAuthorRequest, Validate},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/v2/Authors/GetAllAuthors",
    tag = "Authors",
    security(("bearer" = [])),
    responses((status = 200, body = ApiResponse<Vec<Author>>))
)]
pub async fn list_authors(State(state): State<AppState>) -> Json<ApiResponse<Vec<Author>>> {
    let store = state.store.read().await;
    Json(ApiResponse::fetched(store.list_authors()))
}

#[utoipa::path(
    get,
    path = "/api/v2/Authors/GetAuthorById/{id}",
    params(("id" = i32, Path, description = "Author id")),
    tag = "Authors",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Author>),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_author(
    PathParam(id): PathParam<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Author>>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(ApiResponse::fetched(store.author(id)?)))
}

#[utoipa::path(
    post,
    path = "/api/v2/Authors/CreateAuthor",
    request_body = CreateAuthorRequest,
    tag = "Authors",
    security(("bearer" = [])),
    responses(
        (status = 201, body = ApiResponse<Author>),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateAuthorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Author>>), ApiError> {
    request.validate().map_err(ApiError::bad_request)?;

    let mut store = state.store.write().await;
    let author = store.create_author(request);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(author, "Author created successfully.")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v2/Authors/UpdateAuthor/{id}",
    params(("id" = i32, Path, description = "Author id; must match the body")),
    request_body = UpdateAuthorRequest,
    tag = "Authors",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Author>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_author(
    PathParam(id): PathParam<i32>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateAuthorRequest>,
) -> Result<Json<ApiResponse<Author>>, ApiError> {
    if id != request.id {
        return Err(ApiError::bad_request("Mismatched ID."));
    }
    request.validate().map_err(ApiError::bad_request)?;

    let mut store = state.store.write().await;
    let author = store.update_author(request)?;
    Ok(Json(ApiResponse::ok(author, "Author updated successfully.")))
}

/// Requires the `Admin` role. Fails with 409 while books still reference the
/// author.
#[utoipa::path(
    delete,
    path = "/api/v2/Authors/DeleteAuthor/{id}",
    params(("id" = i32, Path, description = "Author id")),
    tag = "Authors",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<bool>),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    )
)]
pub async fn delete_author(
    AdminOnly(admin): AdminOnly,
    PathParam(id): PathParam<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let mut store = state.store.write().await;
    store.delete_author(id)?;
    tracing::info!(author_id = id, deleted_by = %admin.subject_id, "author deleted");
    Ok(Json(ApiResponse::ok(true, "Author deleted successfully.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{admin_principal, test_state};

    fn create_request(name: &str) -> CreateAuthorRequest {
        CreateAuthorRequest {
            name: name.into(),
            biography: "Novelist".into(),
        }
    }

    #[tokio::test]
    async fn create_then_get_author() {
        let state = test_state();
        let (status, Json(created)) =
            create_author(State(state.clone()), JsonBody(create_request("N. K. Jemisin")))
                .await
                .expect("author creation succeeds");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.code, "SUCCESS-201");

        let Json(fetched) = get_author(PathParam(created.data.id), State(state))
            .await
            .expect("author lookup succeeds");
        assert_eq!(fetched.data, created.data);
    }

    #[tokio::test]
    async fn empty_list_is_ok() {
        let Json(listed) = list_authors(State(test_state())).await;
        assert!(listed.status);
        assert!(listed.data.is_empty());
    }

    #[tokio::test]
    async fn update_with_mismatched_id_is_rejected() {
        let state = test_state();
        let err = update_author(
            PathParam(1),
            State(state),
            JsonBody(UpdateAuthorRequest {
                id: 2,
                name: "x".into(),
                biography: String::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Mismatched ID.");
    }

    #[tokio::test]
    async fn missing_author_is_404() {
        let err = get_author(PathParam(42), State(test_state())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Author not found.");
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let err = create_author(State(test_state()), JsonBody(create_request("  ")))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Author name is required.");
    }

    #[tokio::test]
    async fn admin_deletes_author() {
        let state = test_state();
        let (_, Json(created)) =
            create_author(State(state.clone()), JsonBody(create_request("Le Guin")))
                .await
                .unwrap();

        delete_author(AdminOnly(admin_principal()), PathParam(created.data.id), State(state.clone()))
            .await
            .expect("author deletion succeeds");
        assert!(state.store.read().await.list_authors().is_empty());
    }
}
