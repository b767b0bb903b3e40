//! Embedded stylesheets, scripts and PWA files.

use crate::error::AppError;
use crate::pwa;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderValue;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

const ADMIN_CSS: &str = include_str!("../../static/css/admin.css");

const SCRIPTS: &[(&str, &str)] = &[
    ("main.js", include_str!("../../static/js/main.js")),
    ("pwa-register.js", include_str!("../../static/js/pwa-register.js")),
    ("admin.js", include_str!("../../static/js/admin.js")),
    ("admin-pins.js", include_str!("../../static/js/admin-pins.js")),
    ("admin-disable-sw.js", include_str!("../../static/js/admin-disable-sw.js")),
];

const CSS: &str = "text/css; charset=utf-8";
const JAVASCRIPT: &str = "application/javascript; charset=utf-8";

fn text(content_type: &'static str, body: String) -> Response {
    ([(CONTENT_TYPE, content_type)], body).into_response()
}

pub async fn style_css(State(state): State<Arc<AppState>>) -> Response {
    text(CSS, state.css.clone())
}

pub async fn admin_css() -> Response {
    text(CSS, ADMIN_CSS.to_string())
}

pub async fn script(Path(file): Path<String>) -> Result<Response, AppError> {
    SCRIPTS
        .iter()
        .find(|(name, _)| *name == file)
        .map(|(_, body)| text(JAVASCRIPT, (*body).to_string()))
        .ok_or(AppError::NotFound)
}

pub async fn manifest(State(state): State<Arc<AppState>>) -> Response {
    let colors = &state.config.colors.light;
    let body = pwa::manifest(&state.config.brand, &colors.accent, &colors.background);
    (
        [(CONTENT_TYPE, "application/manifest+json")],
        body.to_string(),
    )
        .into_response()
}

/// The worker is never cached by the browser so a new build is picked up on
/// the next visit.
pub async fn service_worker(State(state): State<Arc<AppState>>) -> Response {
    let mut response = text(JAVASCRIPT, state.service_worker.clone());
    let headers = response.headers_mut();
    headers.insert("service-worker-allowed", HeaderValue::from_static("/"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> &'static str {
        SCRIPTS.iter().find(|(n, _)| *n == name).map(|(_, s)| *s).unwrap()
    }

    #[test]
    fn admin_scripts_follow_login_redirects() {
        for name in ["admin.js", "admin-pins.js"] {
            let script = source(name);
            assert!(script.contains("response.redirected"), "{name}");
            assert!(script.contains("success !== true"), "{name}");
        }
    }

    #[tokio::test]
    async fn unknown_script_is_not_found() {
        let err = script(Path("nada.js".to_string())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
