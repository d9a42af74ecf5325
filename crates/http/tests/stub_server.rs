//! End-to-end tests against an axum stub of the site's API on an ephemeral port.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use recipebox_core::markup;
use recipebox_core::suggest::rendered_rows;
use recipebox_core::{
    Document, FavoriteOutcome, HttpRequest, Method, Page, Transport, WidgetConfig, WidgetError,
};
use recipebox_http::HttpTransport;
use serde_json::json;

const RECIPES: &[(u32, &str)] = &[
    (1, "Tomato Soup"),
    (2, "Sourdough Bread"),
    (3, "Mac & Cheese"),
    (4, "Pea Soup"),
];

// ---------------------------------------------------------------------------
// Stub site
// ---------------------------------------------------------------------------

async fn api_search(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let q = params.get("q").cloned().unwrap_or_default().to_lowercase();
    if q == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" })));
    }
    let limit = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let hits: Vec<serde_json::Value> = RECIPES
        .iter()
        .filter(|(_, title)| title.to_lowercase().contains(&q))
        .take(limit)
        .map(|(id, title)| json!({ "id": id, "title": title }))
        .collect();
    (StatusCode::OK, Json(serde_json::Value::Array(hits)))
}

fn favorite_reply(id: &str, headers: &HeaderMap, liked: bool) -> (StatusCode, Json<serde_json::Value>) {
    let authorized = headers.get("x-csrftoken").and_then(|v| v.to_str().ok()) == Some("tok");
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "redirect": format!("/login?next=/recipe/{id}") })),
        );
    }
    (StatusCode::OK, Json(json!({ "liked": liked })))
}

async fn api_like(Path(id): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    favorite_reply(&id, &headers, true)
}

async fn api_unlike(Path(id): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    favorite_reply(&id, &headers, false)
}

async fn spawn_stub() -> String {
    let app = Router::new()
        .route("/api/search", get(api_search))
        .route("/api/recipes/{id}/favorite", post(api_like).delete(api_unlike));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config_for(base_url: &str) -> WidgetConfig {
    WidgetConfig { base_url: base_url.to_string(), debounce_ms: 10, ..WidgetConfig::default() }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_returns_status_and_body() {
    let base = spawn_stub().await;
    let transport = HttpTransport::new(&config_for(&base)).unwrap();

    let response =
        transport.send(HttpRequest::get("/api/search?q=soup&limit=6")).await.unwrap();
    assert_eq!(response.status, 200);
    let body = response.json().unwrap();
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn error_statuses_are_responses_not_errors() {
    let base = spawn_stub().await;
    let transport = HttpTransport::new(&config_for(&base)).unwrap();

    let response = transport.send(HttpRequest::get("/api/search?q=boom&limit=6")).await.unwrap();
    assert_eq!(response.status, 500);
    assert!(!response.is_success());

    let missing = transport.send(HttpRequest::get("/nope")).await.unwrap();
    assert_eq!(missing.status, 404);
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(&config_for(&format!("http://{addr}"))).unwrap();
    let result = transport.send(HttpRequest::get("/api/search?q=soup&limit=6")).await;
    assert!(matches!(result, Err(WidgetError::Transport(_))));
}

#[tokio::test]
async fn headers_are_forwarded() {
    let base = spawn_stub().await;
    let transport = HttpTransport::new(&config_for(&base)).unwrap();

    let request = HttpRequest::new(Method::Post, "/api/recipes/3/favorite")
        .with_header("Content-Type", "application/json")
        .with_header("X-CSRFToken", "tok");
    let response = transport.send(request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap(), json!({ "liked": true }));
}

// ---------------------------------------------------------------------------
// Widgets over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn suggestions_render_from_live_endpoint() {
    let base = spawn_stub().await;
    let mut doc = Document::new();
    let root = doc.root();
    let header = markup::search_header(&mut doc, root);
    let page = Page::load(doc, HttpTransport::new(&config_for(&base)).unwrap(), config_for(&base));

    page.type_into(header.input, "mac & ch");
    page.settle().await;

    let rows = page.with_document(|doc| rendered_rows(doc, header.panel));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].href, "/recipe/3");
    assert_eq!(rows[0].label, "Mac & Cheese");
}

#[tokio::test]
async fn server_error_leaves_panel_hidden() {
    let base = spawn_stub().await;
    let mut doc = Document::new();
    let root = doc.root();
    let header = markup::search_header(&mut doc, root);
    let page = Page::load(doc, HttpTransport::new(&config_for(&base)).unwrap(), config_for(&base));

    page.type_into(header.input, "boom");
    page.settle().await;

    let visible = page.with_document(|doc| doc.has_class(header.panel, "is-visible"));
    assert!(!visible);
}

#[tokio::test]
async fn favorite_round_trip_with_and_without_csrf() {
    let base = spawn_stub().await;

    let mut doc = Document::new();
    let root = doc.root();
    markup::csrf_meta(&mut doc, root, "tok");
    let card = markup::recipe_card(&mut doc, root, "7", "Lentil Stew", false);
    let page = Page::load(doc, HttpTransport::new(&config_for(&base)).unwrap(), config_for(&base));
    assert_eq!(
        page.toggle_favorite(card.favorite).await,
        Some(FavoriteOutcome::Updated { liked: true })
    );
    assert_eq!(
        page.toggle_favorite(card.favorite).await,
        Some(FavoriteOutcome::Updated { liked: false })
    );

    let mut doc = Document::new();
    let root = doc.root();
    let card = markup::recipe_card(&mut doc, root, "7", "Lentil Stew", false);
    let page = Page::load(doc, HttpTransport::new(&config_for(&base)).unwrap(), config_for(&base));
    assert_eq!(
        page.toggle_favorite(card.favorite).await,
        Some(FavoriteOutcome::Redirected { url: "/login?next=/recipe/7".into() })
    );
    let location = page.with_document(|doc| doc.location().map(str::to_string));
    assert_eq!(location.as_deref(), Some("/login?next=/recipe/7"));
}
