// tests/http_registry.rs

//! HTTP registry client tests against an in-process registry server.

mod common;

use axum::Router;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use common::default_policy;
use portcheck::{Error, HttpRegistry, Investigator, RegistryClient, SupportType};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

async fn package(Path(name): Path<String>) -> Response {
    match name.as_str() {
        "Acme.Http" => Json(json!({
            "name": "Acme.Http",
            "version": "2.1.0",
            "dependencies": ["Acme.Core", "Legacy.Web"],
            "supports_target": true
        }))
        .into_response(),
        "Acme.Core" => Json(json!({ "name": "Acme.Core", "supports_target": true })).into_response(),
        "Legacy.Web" => Json(json!({
            "name": "Legacy.Web",
            "replacement": "Modern.Web"
        }))
        .into_response(),
        "My Package" => Json(json!({ "name": "My Package" })).into_response(),
        "Broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "Garbage" => (StatusCode::OK, "not json").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start a fake registry and return its base URL
async fn start_registry() -> String {
    let app = Router::new().route("/v1/packages/:name", get(package));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_lookup_found() {
    let registry = HttpRegistry::new(&start_registry().await).unwrap();

    let metadata = registry.lookup("Acme.Http").await.unwrap().unwrap();
    assert_eq!(metadata.name, "Acme.Http");
    assert_eq!(metadata.version.as_deref(), Some("2.1.0"));
    assert_eq!(metadata.dependencies, vec!["Acme.Core", "Legacy.Web"]);
    assert!(metadata.supports_target);
}

#[tokio::test]
async fn test_lookup_encodes_name() {
    let registry = HttpRegistry::new(&start_registry().await).unwrap();

    let metadata = registry.lookup("My Package").await.unwrap().unwrap();
    assert_eq!(metadata.name, "My Package");
    assert!(metadata.dependencies.is_empty());
}

#[tokio::test]
async fn test_lookup_not_found() {
    let registry = HttpRegistry::new(&start_registry().await).unwrap();
    assert!(registry.lookup("Nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_server_error_is_download_error() {
    let registry = HttpRegistry::new(&start_registry().await).unwrap();
    assert!(matches!(
        registry.lookup("Broken").await,
        Err(Error::DownloadError(_))
    ));
}

#[tokio::test]
async fn test_bad_body_is_parse_error() {
    let registry = HttpRegistry::new(&start_registry().await).unwrap();
    assert!(matches!(
        registry.lookup("Garbage").await,
        Err(Error::ParseError(_))
    ));
}

#[tokio::test]
async fn test_unreachable_registry_is_download_error() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let registry =
        HttpRegistry::with_timeout(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    assert!(matches!(
        registry.lookup("Acme.Http").await,
        Err(Error::DownloadError(_))
    ));
}

#[tokio::test]
async fn test_investigate_over_http() {
    let registry = Arc::new(HttpRegistry::new(&start_registry().await).unwrap());

    let result = Investigator::new(registry, default_policy())
        .process("http", &["Acme.Http", "Broken"])
        .await
        .unwrap();

    let http = &result.dependencies[0];
    assert_eq!(http.support_type, SupportType::Supported);
    assert_eq!(http.dependencies[0].support_type, SupportType::Supported);

    let legacy = &http.dependencies[1];
    assert_eq!(legacy.support_type, SupportType::KnownReplacementAvailable);
    assert_eq!(legacy.replacement.as_deref(), Some("Modern.Web"));

    let broken = &result.dependencies[1];
    assert_eq!(broken.support_type, SupportType::Error);
    assert!(broken.error.is_some());
}
