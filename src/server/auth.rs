//! Route gates.

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::debug;
use url::form_urlencoded;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Largest request body buffered while looking for an `api_key` field.
const API_BODY_LIMIT: usize = 64 * 1024;

const DEFAULT_REDIRECT: &str = "/admin";

/// `/admin/login?[error=..&]redirect=..`
pub fn login_url(redirect: &str, error: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(error) = error {
        query.append_pair("error", error);
    }
    query.append_pair("redirect", redirect);
    format!("/admin/login?{}", query.finish())
}

/// `target` when it is a path on this site, `/admin` otherwise.
pub fn local_redirect(target: Option<&str>) -> &str {
    match target.map(str::trim) {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && !t.starts_with("/\\") => t,
        _ => DEFAULT_REDIRECT,
    }
}

/// Send visitors without an authenticated session to the login page.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.sessions.is_authenticated(request.headers()) {
        return next.run(request).await;
    }
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(DEFAULT_REDIRECT);
    debug!(path = target, "unauthenticated admin request");
    Redirect::to(&login_url(target, None)).into_response()
}

#[derive(Deserialize)]
struct KeyField {
    api_key: Option<String>,
}

impl KeyField {
    fn key(self) -> Option<String> {
        self.api_key.filter(|k| !k.is_empty())
    }
}

/// Require the API key from the `X-API-Key` header, the `api_key` query
/// parameter or an `api_key` field in a JSON or form body, in that order.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = state.config.api.key.as_bytes();

    let supplied = header_key(request.headers()).or_else(|| {
        request
            .uri()
            .query()
            .and_then(|q| serde_urlencoded::from_str::<KeyField>(q).ok())
            .and_then(KeyField::key)
    });
    if let Some(key) = supplied {
        return if keys_match(&key, expected) {
            Ok(next.run(request).await)
        } else {
            Err(ApiError::Unauthorized)
        };
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, API_BODY_LIMIT)
        .await
        .map_err(|_| ApiError::Unauthorized)?;
    match body_key(&parts.headers, &bytes) {
        Some(key) if keys_match(&key, expected) => {
            let request = Request::from_parts(parts, Body::from(bytes));
            Ok(next.run(request).await)
        }
        _ => Err(ApiError::Unauthorized),
    }
}

fn header_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn body_key(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let field = if content_type.starts_with("application/json") {
        serde_json::from_slice::<KeyField>(body).ok()
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        serde_urlencoded::from_bytes::<KeyField>(body).ok()
    } else {
        None
    };
    field.and_then(KeyField::key)
}

pub fn keys_match(supplied: &str, expected: &[u8]) -> bool {
    supplied.as_bytes().ct_eq(expected).into()
}
