mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{FakeProvider, external_movie};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let provider = Arc::new(FakeProvider::with_movies(vec![external_movie(
        "tt0113277",
        "Heat",
        Some(1995),
    )]));

    let state = cinelog::api::create_app_state_with_metadata(common::test_config(), provider)
        .await
        .expect("Failed to create app state");
    cinelog::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, set_cookie, json)
}

/// Registers and logs in; returns the session cookie.
async fn login_as(app: &Router, email: &str) -> String {
    let (status, _, _) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"email": email, "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, cookie, _) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    cookie.expect("login sets a session cookie")
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let (status, _, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = spawn_app().await;

    for uri in ["/api/movies", "/api/movies/recent", "/api/auth/me", "/api/tmdb/search?q=heat"] {
        let (status, _, body) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["category"], json!("unauthorized"));
    }
}

#[tokio::test]
async fn test_register_login_me() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "first@example.com").await;

    let (status, _, body) = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!("first@example.com"));
    assert_eq!(body["data"]["nickname"], json!("first"));
    assert_eq!(body["data"]["is_admin"], json!(true));

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "first@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["status"], json!(401));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = spawn_app().await;
    login_as(&app, "dup@example.com").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"email": "dup@example.com", "password": "password123"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["category"], json!("conflict"));
    assert_eq!(body["error"]["field_errors"][0]["field"], json!("email"));
}

#[tokio::test]
async fn test_movie_validation_and_rules() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "viewer@example.com").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/movies",
        Some(&cookie),
        Some(json!({"title": "", "rating": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["category"], json!("validation"));
    let fields: Vec<&str> = body["error"]["field_errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "rating"]);

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/movies",
        Some(&cookie),
        Some(json!({"title": "Alien", "rating": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"]["field_errors"][0]["code"],
        json!("RATING_WITHOUT_WATCHED")
    );

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/movies",
        Some(&cookie),
        Some(json!({"title": "Alien", "year": 1979, "watched": true, "rating": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();
    assert!(body["data"]["last_watched_at"].is_string());

    let (status, _, body) = send(
        &app,
        "PUT",
        &format!("/api/movies/{id}"),
        Some(&cookie),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field_errors"][0]["code"], json!("EMPTY_UPDATE"));

    let (status, _, body) = send(
        &app,
        "PUT",
        &format!("/api/movies/{id}"),
        Some(&cookie),
        Some(json!({"watched": false, "rating": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["last_watched_at"].is_null());
}

#[tokio::test]
async fn test_movie_crud_is_owner_scoped() {
    let app = spawn_app().await;
    let owner = login_as(&app, "owner@example.com").await;
    let other = login_as(&app, "other@example.com").await;

    let (_, _, body) = send(
        &app,
        "POST",
        "/api/movies",
        Some(&owner),
        Some(json!({"title": "Ronin", "genre": "Thriller"})),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/movies/{id}");

    let (status, _, _) = send(&app, "GET", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(
        &app,
        "PUT",
        &format!("{uri}/favorite"),
        Some(&other),
        Some(json!({"favorite": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, "DELETE", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = send(
        &app,
        "PUT",
        &format!("{uri}/favorite"),
        Some(&owner),
        Some(json!({"favorite": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["favorite"], json!(true));

    let (_, _, body) = send(&app, "GET", "/api/movies/favorites", Some(&owner), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, _, body) = send(&app, "GET", "/api/movies?q=thrill", Some(&owner), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, _, body) = send(&app, "GET", "/api/movies", Some(&other), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _, _) = send(&app, "DELETE", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&app, "GET", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["category"], json!("not_found"));
}

#[tokio::test]
async fn test_tmdb_add_is_idempotent() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "importer@example.com").await;

    let request = json!({"external_id": "tt0113277", "watched": true});

    let (status, _, first) =
        send(&app, "POST", "/api/tmdb/add", Some(&cookie), Some(request.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["created"], json!(true));
    assert_eq!(first["data"]["movie"]["title"], json!("Heat"));

    let (status, _, second) =
        send(&app, "POST", "/api/tmdb/add", Some(&cookie), Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["created"], json!(false));
    assert_eq!(second["data"]["movie"]["id"], first["data"]["movie"]["id"]);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/tmdb/add",
        Some(&cookie),
        Some(json!({"external_id": "tt9999999"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) =
        send(&app, "GET", "/api/tmdb/search?q=heat", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["external_id"], json!("tt0113277"));
}

#[tokio::test]
async fn test_malformed_json_uses_error_shape() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["category"], json!("validation"));
}

#[tokio::test]
async fn test_create_after_import_reports_taken_external_id() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "collector@example.com").await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/tmdb/add",
        Some(&cookie),
        Some(json!({"external_id": "tt0113277"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/movies",
        Some(&cookie),
        Some(json!({"title": "Heat", "external_id": "tt0113277"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["category"], json!("validation"));
    assert_eq!(body["error"]["field_errors"][0]["field"], json!("external_id"));
    assert_eq!(body["error"]["field_errors"][0]["code"], json!("ALREADY_TAKEN"));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-request-id header");
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}
