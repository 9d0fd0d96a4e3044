//! Client tests against an in-process backend

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use pagecraft_client::{ApiClient, ClientError, EditorBootstrap};
use serde_json::{json, Value};
use std::collections::HashMap;

async fn stores() -> Json<Value> {
    Json(json!({ "data": [
        { "id": 1, "uuid": "store-a", "name": "Alpha" },
        { "id": 2, "uuid": "store-b", "name": "Beta" }
    ]}))
}

async fn pixel_stores(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let uuid = params.get("store_uuid").cloned().unwrap_or_default();
    Json(json!([
        { "id": 10, "store_uuid": uuid, "platform": "meta", "pixel_id": "px-1" }
    ]))
}

async fn landing_page(Path(id): Path<String>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer secret");
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if id != "42" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "id": 42,
        "title": "Spring sale",
        "html": "<section><h2>Sale</h2></section>",
        "css": ".hero { color: red; }"
    })))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/public/stores", get(stores))
        .route("/api/public/pixel-stores", get(pixel_stores))
        .route("/api/landing-pages/:id", get(landing_page));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_fetches_wrapped_and_bare_lists() {
    let base = spawn_backend().await;
    let client = ApiClient::new(&base).unwrap();

    let stores = client.stores().await.unwrap();
    assert_eq!(stores.len(), 2);
    assert_eq!(stores[1].uuid, "store-b");

    let pixels = client.pixel_stores("store-a").await.unwrap();
    assert_eq!(pixels[0].store_uuid, "store-a");
    assert_eq!(pixels[0].pixel_id, "px-1");
}

#[tokio::test]
async fn test_landing_page_needs_token() {
    let base = spawn_backend().await;

    let anonymous = ApiClient::new(&base).unwrap();
    match anonymous.landing_page("42").await {
        Err(ClientError::Status { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected 401, got {:?}", other),
    }

    let client = ApiClient::new(&base).unwrap().with_token("secret");
    let page = client.landing_page("42").await.unwrap();
    assert_eq!(page.title, "Spring sale");
    assert_eq!(page.html, "<section><h2>Sale</h2></section>");
}

#[tokio::test]
async fn test_bootstrap_collects_errors() {
    let base = spawn_backend().await;
    let client = ApiClient::new(&base).unwrap().with_token("secret");

    let state = EditorBootstrap::load(&client, Some("store-a"), Some("missing")).await;
    assert_eq!(state.stores.len(), 2);
    assert_eq!(state.pixels.len(), 1);
    assert!(state.page.is_none());
    assert_eq!(state.errors.len(), 1);
    assert!(state.errors[0].contains("404"));
    assert!(!state.loading.any());

    // No page loaded: a new page starts from the placeholder
    let payload = state.payload();
    assert!(payload.html.is_empty());
    assert!(!payload.initial_html().is_empty());
}

#[tokio::test]
async fn test_bootstrap_survives_unreachable_backend() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{}", addr)).unwrap();
    let state = EditorBootstrap::load(&client, Some("store-a"), None).await;

    assert!(state.stores.is_empty());
    assert!(state.pixels.is_empty());
    assert_eq!(state.errors.len(), 2);
    assert!(!state.loading.any());
}

#[tokio::test]
async fn test_loaded_page_becomes_payload() {
    let base = spawn_backend().await;
    let client = ApiClient::new(&base).unwrap().with_token("secret");

    let state = EditorBootstrap::load(&client, None, Some("42")).await;
    assert!(state.errors.is_empty());
    let payload = state.payload();
    assert_eq!(payload.css, ".hero { color: red; }");
    assert_eq!(payload.initial_html(), "<section><h2>Sale</h2></section>");
}
