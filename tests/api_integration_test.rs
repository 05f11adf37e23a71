use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use image_editor::config::AppConfig;
use image_editor::infrastructure::database;
use image_editor::services::storage::LocalStorageService;
use image_editor::{AppState, create_app};
use sea_orm::Database;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_test_app(dir: &TempDir) -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let upload = dir.path().join("uploads");
    let public = dir.path().join("static");
    std::fs::create_dir_all(&upload).unwrap();
    std::fs::create_dir_all(&public).unwrap();

    let config = AppConfig::for_dirs(&upload, &public);
    let storage = Arc::new(LocalStorageService::new(upload));
    create_app(AppState::new(db, storage, config))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&body).to_string())
}

#[tokio::test]
async fn test_health_check() {
    let dir = TempDir::new().unwrap();
    let app = setup_test_app(&dir).await;

    let (status, _, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");
}

#[tokio::test]
async fn test_index_and_about_pages() {
    let dir = TempDir::new().unwrap();
    let app = setup_test_app(&dir).await;

    for uri in ["/", "/edit"] {
        let (status, _, html) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("enctype=\"multipart/form-data\""));
        for op in [
            "cgray",
            "cwebp",
            "cjpg",
            "cpng",
            "cblur",
            "cthreshold",
            "cresize",
            "csmoothing",
        ] {
            assert!(html.contains(&format!("value=\"{}\"", op)), "{} missing", op);
        }
    }

    let (status, _, html) = get(&app, "/about").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>About</h1>"));
}

#[tokio::test]
async fn test_empty_listing() {
    let dir = TempDir::new().unwrap();
    let app = setup_test_app(&dir).await;

    let (status, _, html) = get(&app, "/images").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No images processed yet."));
    assert!(!html.contains("Image not found"));

    let (status, _, body) = get(&app, "/api/images").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), Value::Array(vec![]));
}

#[tokio::test]
async fn test_unknown_image_redirects_with_notice() {
    let dir = TempDir::new().unwrap();
    let app = setup_test_app(&dir).await;

    for id in ["0b5e8f5e-51d6-4a8f-9d3b-7f1a8c1f2a10", "not-a-uuid"] {
        let (status, headers, _) = get(&app, &format!("/images/{}", id)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(
            headers.get(header::LOCATION).unwrap(),
            "/images?notice=not-found"
        );
    }

    let (status, _, html) = get(&app, "/images?notice=not-found").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Image not found"));

    // Unrecognised notice keys are ignored
    let (_, _, html) = get(&app, "/images?notice=%3Cscript%3E").await;
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn test_unknown_image_json_is_404() {
    let dir = TempDir::new().unwrap();
    let app = setup_test_app(&dir).await;

    let (status, _, body) = get(&app, "/api/images/0b5e8f5e-51d6-4a8f-9d3b-7f1a8c1f2a10").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let dir = TempDir::new().unwrap();
    let app = setup_test_app(&dir).await;

    let (_, headers, _) = get(&app, "/health").await;
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document() {
    let dir = TempDir::new().unwrap();
    let app = setup_test_app(&dir).await;

    let (status, _, body) = get(&app, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["paths"]["/api/images"].is_object());
    assert!(json["paths"]["/api/images/{id}"].is_object());
    assert!(json["paths"]["/health"].is_object());
}
