// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, HeaderName},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{fault_boundary, request_gate, Principal, RequestGate},
    error::{ApiError, ErrorResponse},
    models::{
        Author, Book, CreateAuthorRequest, CreateBookRequest, CreateLibraryRequest,
        CreatePublisherRequest, Library, LoginRequest, LoginResponse, Publisher, RegisterRequest,
        UpdateAuthorRequest, UpdateBookRequest, UpdateLibraryRequest, UpdatePublisherRequest,
    },
    state::AppState,
};

pub mod authors;
pub mod books;
pub mod health;
pub mod libraries;
pub mod publishers;
pub mod users;

pub const LOGIN_PATH: &str = "/api/v2/User/LoginUser";
pub const REGISTER_PATH: &str = "/api/v2/User/RegisterUser";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// JSON body extractor that reports malformed input with the API's failure
/// envelope instead of axum's plain-text rejection.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!(%rejection, "request body rejected");
                Err(ApiError::bad_request("Invalid request."))
            }
        }
    }
}

/// Path extractor with the same failure envelope as [`JsonBody`].
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PathParam(value)),
            Err(rejection) => {
                tracing::debug!(%rejection, "path parameter rejected");
                Err(ApiError::bad_request("Invalid request."))
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    let gate = RequestGate::new(state.validator.clone())
        .allow_anonymous(LOGIN_PATH)
        .allow_anonymous(REGISTER_PATH);

    // Every route registered here passes through the gate.
    let api_routes = Router::new()
        .route(LOGIN_PATH, post(users::login_user))
        .route(REGISTER_PATH, post(users::register_user))
        .route("/api/v2/User/Me", get(users::me))
        .route("/api/v2/Authors/GetAllAuthors", get(authors::list_authors))
        .route("/api/v2/Authors/GetAuthorById/{id}", get(authors::get_author))
        .route("/api/v2/Authors/CreateAuthor", post(authors::create_author))
        .route("/api/v2/Authors/UpdateAuthor/{id}", put(authors::update_author))
        .route("/api/v2/Authors/DeleteAuthor/{id}", delete(authors::delete_author))
        .route("/api/v2/Books/GetAllBooks", get(books::list_books))
        .route("/api/v2/Books/GetBookById/{id}", get(books::get_book))
        .route("/api/v2/Books/CreateBook", post(books::create_book))
        .route("/api/v2/Books/UpdateBook/{id}", put(books::update_book))
        .route("/api/v2/Books/DeleteBook/{id}", delete(books::delete_book))
        .route(
            "/api/v2/Publishers/GetAllPublishers",
            get(publishers::list_publishers),
        )
        .route(
            "/api/v2/Publishers/GetPublisherById/{id}",
            get(publishers::get_publisher),
        )
        .route(
            "/api/v2/Publishers/CreatePublisher",
            post(publishers::create_publisher),
        )
        .route(
            "/api/v2/Publishers/UpdatePublisher/{id}",
            put(publishers::update_publisher),
        )
        .route(
            "/api/v2/Publishers/DeletePublisher/{id}",
            delete(publishers::delete_publisher),
        )
        .route("/api/v2/Library/GetAllLibraries", get(libraries::list_libraries))
        .route("/api/v2/Library/GetLibraryById/{id}", get(libraries::get_library))
        .route("/api/v2/Library/CreateLibrary", post(libraries::create_library))
        .route("/api/v2/Library/UpdateLibrary/{id}", put(libraries::update_library))
        .route("/api/v2/Library/DeleteId/{id}", delete(libraries::delete_library))
        .route_layer(middleware::from_fn_with_state(gate, request_gate))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(fault_boundary())
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CorsLayer::permissive()),
        )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        users::login_user,
        users::register_user,
        users::me,
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        publishers::list_publishers,
        publishers::get_publisher,
        publishers::create_publisher,
        publishers::update_publisher,
        publishers::delete_publisher,
        libraries::list_libraries,
        libraries::get_library,
        libraries::create_library,
        libraries::update_library,
        libraries::delete_library,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            ErrorResponse,
            Principal,
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            Author,
            CreateAuthorRequest,
            UpdateAuthorRequest,
            Book,
            CreateBookRequest,
            UpdateBookRequest,
            Publisher,
            CreatePublisherRequest,
            UpdatePublisherRequest,
            Library,
            CreateLibraryRequest,
            UpdateLibraryRequest
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "User", description = "Login, registration and the current principal"),
        (name = "Authors", description = "Author management"),
        (name = "Books", description = "Book management"),
        (name = "Publishers", description = "Publisher management"),
        (name = "Library", description = "Library management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use crate::{auth::SharedSecret, config::AuthSettings, identity::LockoutPolicy};
    use std::sync::Arc;

    let settings = AuthSettings::new(
        SharedSecret::new("ThisIsAStrongSecretKey12345").expect("non-blank secret"),
        "TestIssuer",
        "TestAudience",
    );
    AppState::new(Arc::new(settings), LockoutPolicy::default())
}

#[cfg(test)]
pub(crate) fn admin_principal() -> Principal {
    use crate::auth::{roles, ClaimAssertion};

    Principal::from_verified(
        ClaimAssertion {
            subject_id: "admin-1".into(),
            email: "admin@library.test".into(),
            roles: roles::admin_roles().into_iter().collect(),
        },
        chrono::Utc::now(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn openapi_declares_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let schemes = doc.components.expect("components").security_schemes;
        assert!(schemes.contains_key("bearer"));
    }

    #[tokio::test]
    async fn health_and_docs_need_no_token() {
        for uri in ["/health/live", "/health/ready", "/api-doc/openapi.json"] {
            let response = router(test_state())
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let response = router(test_state())
            .oneshot(Request::get("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn malformed_json_uses_failure_envelope() {
        let response = router(test_state())
            .oneshot(
                Request::post(LOGIN_PATH)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], "Invalid request.");
    }

    #[tokio::test]
    async fn malformed_path_id_uses_failure_envelope() {
        let state = test_state();
        let token = state
            .issuer
            .issue("u1", crate::auth::roles::default_roles(), "u1@library.test")
            .unwrap()
            .token;
        let app = router(state);

        for uri in [
            "/api/v2/Authors/GetAuthorById/abc",
            "/api/v2/Library/GetLibraryById/not-a-uuid",
        ] {
            let response = app
                .clone()
                .oneshot(
                    Request::get(uri)
                        .header(header::AUTHORIZATION, format!("Bearer {token}"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body, serde_json::json!({ "statusCode": 400, "message": "Invalid request." }));
        }
    }

    #[tokio::test]
    async fn catalog_routes_require_a_token() {
        let response = router(test_state())
            .oneshot(
                Request::get("/api/v2/Authors/GetAllAuthors")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
