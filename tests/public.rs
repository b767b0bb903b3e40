//! Reader-facing pages, embedded assets and the installable app files.

mod common;

use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use common::{TestApp, body_json, body_string};

fn header<'a>(response: &'a axum::http::Response<axum::body::Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn empty_home_shows_placeholder() {
    let app = TestApp::new().await;
    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("empty-state"));
    assert!(!html.contains("hero-card"));
}

#[tokio::test]
async fn home_lists_seeded_articles() {
    let app = TestApp::seeded().await;
    let html = body_string(app.get("/").await).await;
    assert!(html.contains("hero-card"));
    for slug in [
        "casa-observatorio-mata-atlantica",
        "galeria-luz-brasilia",
        "residencia-orla-brava",
    ] {
        assert!(html.contains(&format!("/artigos/{slug}")), "{slug}");
    }
    assert!(html.contains("product-pin"));
}

#[tokio::test]
async fn article_page_renders_pins_with_tracked_links() {
    let app = TestApp::seeded().await;
    let response = app.get("/artigos/casa-observatorio-mata-atlantica").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;

    assert!(html.contains("Casa Observatório na Mata Atlântica"));
    assert!(html.contains("Estrutura leve em balanço"));
    assert!(html.contains("Poltrona Aurora"));
    assert!(html.contains("left:28%;top:62%"));
    assert!(html.contains("https://loja.habitare.com/produtos/poltrona-aurora?"));
    assert!(html.contains("utm_content=poltrona-aurora"));
}

#[tokio::test]
async fn unknown_article_is_not_found() {
    let app = TestApp::seeded().await;
    let response = app.get("/artigos/nao-existe").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Conteúdo não encontrado"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let app = TestApp::new().await;
    let response = app.get("/qualquer/coisa").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Página não encontrada"));
}

#[tokio::test]
async fn coming_soon_page() {
    let app = TestApp::new().await;
    let response = app.get("/em-desenvolvimento").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Em desenvolvimento"));
}

#[tokio::test]
async fn embedded_assets_are_served() {
    let app = TestApp::new().await;

    let css = app.get("/css/style.css").await;
    assert_eq!(css.status(), StatusCode::OK);
    assert!(header(&css, CONTENT_TYPE.as_str()).starts_with("text/css"));

    let script = app.get("/js/main.js").await;
    assert_eq!(script.status(), StatusCode::OK);
    assert!(header(&script, CONTENT_TYPE.as_str()).starts_with("application/javascript"));

    let missing = app.get("/js/nada.js").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manifest_describes_the_brand() {
    let app = TestApp::new().await;
    let response = app.get("/manifest.json").await;
    assert_eq!(header(&response, CONTENT_TYPE.as_str()), "application/manifest+json");
    let manifest = body_json(response).await;
    assert_eq!(manifest["name"], "Revista Habitare");
    assert_eq!(manifest["start_url"], "/");
    assert_eq!(manifest["display"], "standalone");
}

#[tokio::test]
async fn service_worker_is_uncached_and_versioned() {
    let app = TestApp::new().await;
    let response = app.get("/sw.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "service-worker-allowed"), "/");
    assert_eq!(header(&response, CACHE_CONTROL.as_str()), "no-cache");
    let script = body_string(response).await;
    assert!(!script.contains("__CACHE_VERSION__"));
    assert!(script.contains("habitare-"));
}

#[tokio::test]
async fn uploads_are_served_from_disk() {
    let app = TestApp::new().await;
    std::fs::write(app.uploads.path().join("hero-1.png"), common::PNG).unwrap();

    let response = app.get("/uploads/hero-1.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, CONTENT_TYPE.as_str()), "image/png");
}
