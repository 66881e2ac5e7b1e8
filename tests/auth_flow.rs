// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end requests through the full router: gate, handlers and
//! error envelopes.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use library_service::{
    api::router,
    auth::{roles, SharedSecret},
    config::{AdminSeed, AuthSettings},
    identity::LockoutPolicy,
    state::AppState,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

const ME: &str = "/api/v2/User/Me";

fn state() -> AppState {
    let settings = AuthSettings::new(
        SharedSecret::new("ThisIsAStrongSecretKey12345").unwrap(),
        "TestIssuer",
        "TestAudience",
    );
    AppState::new(Arc::new(settings), LockoutPolicy::default())
}

fn admin_state() -> AppState {
    let state = state();
    state
        .seed_admin(&AdminSeed {
            username: "libadmin".into(),
            email: "admin@library.test".into(),
            password: "Admin@123".into(),
        })
        .unwrap();
    state
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::delete(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/v2/User/LoginUser",
            None,
            json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn register_and_login(app: &Router) -> (String, String) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/v2/User/RegisterUser",
            None,
            json!({
                "username": "reader01",
                "email": "reader@library.test",
                "password": "Secret@1",
                "confirmPassword": "Secret@1",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let user_id = body["data"].as_str().unwrap().to_string();
    (user_id, login(app, "reader01", "Secret@1").await)
}

fn assert_unauthorized(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, &json!({ "statusCode": 401, "message": "Unauthorized Request." }));
}

#[tokio::test]
async fn issued_token_reaches_the_handler() {
    let state = state();
    let token = state
        .issuer
        .issue("u1", roles::default_roles(), "u1@library.test")
        .unwrap()
        .token;
    let app = router(state);

    let (status, body) = send(&app, get(ME, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subjectId"], "u1");
    assert_eq!(body["data"]["roles"], json!(["User"]));
}

#[tokio::test]
async fn promoting_role_in_payload_is_rejected() {
    let state = state();
    let token = state
        .issuer
        .issue("u1", roles::default_roles(), "u1@library.test")
        .unwrap()
        .token;

    let mut parts = token.split('.');
    let (header, payload, signature) = (
        parts.next().unwrap(),
        parts.next().unwrap(),
        parts.next().unwrap(),
    );
    let mut claims: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
    claims["role"] = json!(["Admin", "User"]);
    let forged = format!(
        "{header}.{}.{signature}",
        URL_SAFE_NO_PAD.encode(claims.to_string())
    );

    let (status, body) = send(&router(state), get(ME, Some(&forged))).await;
    assert_unauthorized(status, &body);
}

#[tokio::test]
async fn token_for_another_subject_key_is_rejected() {
    let state = state();
    let token = state
        .issuer
        .issue("u1", roles::default_roles(), "u1@library.test")
        .unwrap()
        .token;

    let mut parts = token.split('.');
    let (header, payload, signature) = (
        parts.next().unwrap(),
        parts.next().unwrap(),
        parts.next().unwrap(),
    );
    let mut claims: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
    claims["email"] = json!("someone-else@library.test");
    let forged = format!(
        "{header}.{}.{signature}",
        URL_SAFE_NO_PAD.encode(claims.to_string())
    );

    let (status, body) = send(&router(state), get(ME, Some(&forged))).await;
    assert_unauthorized(status, &body);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let state = state();
    let token = state
        .issuer
        .issue_at(
            "u1",
            roles::default_roles(),
            "u1@library.test",
            Utc::now() - Duration::minutes(40),
        )
        .unwrap()
        .token;

    let (status, body) = send(&router(state), get(ME, Some(&token))).await;
    assert_unauthorized(status, &body);
}

#[tokio::test]
async fn missing_and_empty_credentials_are_rejected() {
    let app = router(state());

    let (status, body) = send(&app, get(ME, None)).await;
    assert_unauthorized(status, &body);

    let empty_bearer = Request::get(ME)
        .header(header::AUTHORIZATION, "Bearer ")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, empty_bearer).await;
    assert_unauthorized(status, &body);

    let basic = Request::get(ME)
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, basic).await;
    assert_unauthorized(status, &body);
}

#[tokio::test]
async fn rejected_write_does_not_reach_the_store() {
    let state = state();
    let app = router(state.clone());

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v2/Authors/CreateAuthor",
            Some("not.a.token"),
            json!({ "name": "Ursula K. Le Guin" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(state.store.read().await.list_authors().is_empty());
}

#[tokio::test]
async fn registered_user_can_manage_the_catalog() {
    let app = router(state());
    let (user_id, token) = register_and_login(&app).await;

    let (status, body) = send(&app, get("/api/v2/Authors/GetAllAuthors", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v2/Authors/CreateAuthor",
            Some(&token),
            json!({ "name": "Ursula K. Le Guin", "biography": "Earthsea" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["code"], "SUCCESS-201");
    let author_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v2/Library/CreateLibrary",
            Some(&token),
            json!({
                "libraryName": "Central",
                "location": "Main Street",
                "contactNo": "555-0100",
                "userId": user_id,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["userId"], user_id.as_str());

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/v2/Authors/UpdateAuthor/{author_id}"),
            Some(&token),
            json!({ "id": author_id + 1, "name": "Le Guin" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Mismatched ID.");

    let (status, body) = send(
        &app,
        get(&format!("/api/v2/Authors/GetAuthorById/{author_id}"), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ursula K. Le Guin");
}

#[tokio::test]
async fn deletes_require_the_admin_role() {
    let app = router(admin_state());
    let (_, user_token) = register_and_login(&app).await;
    let admin_token = login(&app, "libadmin", "Admin@123").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v2/Authors/CreateAuthor",
            Some(&user_token),
            json!({ "name": "Ursula K. Le Guin" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v2/Authors/DeleteAuthor/{}", body["data"]["id"]);

    let (status, body) = send(&app, delete(&uri, &user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden.");

    let (status, body) = send(&app, delete(&uri, &admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);

    let (status, body) = send(&app, delete(&uri, &admin_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Author not found.");
}

#[tokio::test]
async fn referenced_author_cannot_be_deleted() {
    let app = router(admin_state());
    let admin_token = login(&app, "libadmin", "Admin@123").await;
    let (user_id, token) = register_and_login(&app).await;

    let (_, author) = send(
        &app,
        json_request(
            "POST",
            "/api/v2/Authors/CreateAuthor",
            Some(&token),
            json!({ "name": "Frank Herbert" }),
        ),
    )
    .await;
    let (_, publisher) = send(
        &app,
        json_request(
            "POST",
            "/api/v2/Publishers/CreatePublisher",
            Some(&token),
            json!({ "name": "Chilton", "contactNo": "555-0101", "publishYear": 1965 }),
        ),
    )
    .await;
    let (_, library) = send(
        &app,
        json_request(
            "POST",
            "/api/v2/Library/CreateLibrary",
            Some(&token),
            json!({
                "libraryName": "Central",
                "location": "Main Street",
                "contactNo": "555-0100",
                "userId": user_id,
            }),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v2/Books/CreateBook",
            Some(&token),
            json!({
                "bookName": "Dune",
                "title": "Dune",
                "language": "English",
                "availableBooks": 3,
                "authorId": author["data"]["id"],
                "publisherId": publisher["data"]["id"],
                "libraryId": library["data"]["id"],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let uri = format!("/api/v2/Authors/DeleteAuthor/{}", author["data"]["id"]);
    let (status, body) = send(&app, delete(&uri, &admin_token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);
}

#[tokio::test]
async fn wrong_password_is_a_client_error_not_a_gate_rejection() {
    let app = router(state());
    register_and_login(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v2/User/LoginUser",
            None,
            json!({ "username": "reader01", "password": "Wrong@1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid password.");
}
