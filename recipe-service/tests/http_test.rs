mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{offline_state, TestApp};
use recipe_service::startup::build_router;
use service_core::middleware::REQUEST_ID_HEADER;
use tower::util::ServiceExt;

#[tokio::test]
async fn index_renders_with_layout() {
    let app = build_router(offline_state().await);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("<title>Recipes</title>"));
    assert!(html.contains("<main id=\"content\">"));
}

#[tokio::test]
async fn static_assets_are_served() {
    let app = build_router(offline_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/static/css/main.css")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/css"));
}

#[tokio::test]
async fn missing_static_asset_is_not_found() {
    let app = build_router(offline_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/static/nope.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = build_router(offline_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(REQUEST_ID_HEADER, "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
}

#[tokio::test]
#[ignore = "Requires MongoDB at localhost:27017 (set TEST_MONGODB_URI)"]
async fn health_check_works() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "recipe-service");

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires MongoDB at localhost:27017 (set TEST_MONGODB_URI)"]
async fn readiness_check_works() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);

    app.cleanup().await;
}
