//! Back-office handlers.

use super::auth::{local_redirect, login_url};
use crate::authoring;
use crate::error::{ApiError, AppError};
use crate::pins::{self, PinsPayload};
use crate::state::AppState;
use crate::types::Article;
use crate::upload::{self, ArticleSubmission};
use crate::views;
use crate::views::admin::ArticleRow;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, Multipart, Path, Query, State};
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

pub const LOGIN_FAILED: &str = "credenciais-invalidas";

/// Path ids that are not integers name no article.
fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    redirect: Option<String>,
    error: Option<String>,
}

pub async fn login_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    let target = local_redirect(query.redirect.as_deref());
    if state.sessions.is_authenticated(&headers) {
        return Redirect::to(target).into_response();
    }
    Html(views::admin::login(target, query.error.is_some()).into_string()).into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    username: String,
    password: String,
    redirect: Option<String>,
}

pub async fn login(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    let auth = &state.config.auth;
    let user_ok = form.username.as_bytes().ct_eq(auth.admin_username.as_bytes());
    let pass_ok = form.password.as_bytes().ct_eq(auth.admin_password.as_bytes());
    let target = local_redirect(form.redirect.as_deref());

    if bool::from(user_ok & pass_ok) {
        info!("admin logged in");
        let cookie = state.sessions.login();
        ([(SET_COOKIE, cookie)], Redirect::to(target)).into_response()
    } else {
        warn!(username = %form.username, "admin login failed");
        Redirect::to(&login_url(target, Some(LOGIN_FAILED))).into_response()
    }
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let cookie = state.sessions.logout(&headers);
    ([(SET_COOKIE, cookie)], Redirect::to("/admin/login")).into_response()
}

pub async fn check_auth(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<Value> {
    Json(json!({ "authenticated": state.sessions.is_authenticated(&headers) }))
}

// ============================================================================
// Articles
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    flash: Option<String>,
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let articles = state.store.list_articles().await?;
    let pins = state.store.pins_by_article().await?;
    let rows: Vec<ArticleRow> = articles
        .into_iter()
        .map(|article| ArticleRow {
            pin_count: pins.get(&article.id).map_or(0, Vec::len),
            article,
        })
        .collect();
    Ok(Html(
        views::admin::dashboard(&rows, query.flash.as_deref()).into_string(),
    ))
}

async fn publish_new(state: &AppState, s: &ArticleSubmission) -> Result<i64, AppError> {
    let hero = s.hero_url();
    let draft = authoring::draft_for_create(&s.form, hero.as_deref(), &today())?;
    Ok(state
        .store
        .create_article_with_images(&draft, &s.image_urls())
        .await?)
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let submission = upload::read_article_submission(multipart, &state.config.paths.uploads).await?;
    let result = publish_new(&state, &submission).await;
    if result.is_err() {
        submission.discard().await;
    }
    let id = result?;

    info!(id, "article created");
    Ok(Redirect::to("/admin?flash=artigo-criado"))
}

pub async fn edit_article(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = parse_id(&raw_id).ok_or(AppError::NotFound)?;
    let article = state
        .store
        .find_article(id)
        .await?
        .ok_or(AppError::EditTargetNotFound(id))?;
    let images = state.store.images_for_article(id).await?;
    Ok(Html(views::admin::edit(&article, &images).into_string()))
}

async fn publish_update(
    state: &AppState,
    existing: &Article,
    s: &ArticleSubmission,
) -> Result<(), AppError> {
    let hero = s.hero_url();
    let draft = authoring::draft_for_update(&s.form, hero.as_deref(), existing)?;
    state
        .store
        .update_article_with_images(existing.id, &draft, &s.image_urls())
        .await?;
    Ok(())
}

pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let id = parse_id(&raw_id).ok_or(AppError::NotFound)?;
    let existing = state
        .store
        .find_article(id)
        .await?
        .ok_or(AppError::EditTargetNotFound(id))?;
    let submission = upload::read_article_submission(multipart, &state.config.paths.uploads).await?;

    let result = publish_update(&state, &existing, &submission).await;
    if result.is_err() {
        submission.discard().await;
    }
    result?;

    info!(id, "article updated");
    Ok(Redirect::to("/admin?flash=artigo-atualizado"))
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::ArticleId(raw_id.clone()))?;
    state.store.delete_article(id).await?;
    info!(id, "article deleted");
    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// Pins
// ============================================================================

pub async fn pins_page(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = parse_id(&raw_id).ok_or(AppError::NotFound)?;
    let article = state
        .store
        .find_article(id)
        .await?
        .ok_or(AppError::EditTargetNotFound(id))?;
    let pins = state.store.pins_for_article(id).await?;
    Ok(Html(views::admin::pins(&article, &pins).into_string()))
}

/// Replace the article's pins with the submitted set.
///
/// A body that is not JSON is answered in JSON too: 404 for an unknown
/// article, 400 otherwise. The stored pins are left untouched either way.
pub async fn save_pins(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<PinsPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::ArticleId(raw_id.clone()))?;
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            if state.store.find_article(id).await?.is_none() {
                return Err(ApiError::ArticleId(raw_id));
            }
            warn!(article = id, error = %rejection.body_text(), "rejected pin payload");
            return Err(ApiError::PinPayload(rejection.body_text()));
        }
    };
    let source = &state.config.tracking.source;
    let pins: Vec<_> = payload
        .into_inputs()
        .iter()
        .map(|input| pins::normalize(input, source))
        .collect();

    let total = state
        .store
        .replace_pins(id, &pins)
        .await
        .map_err(ApiError::pins)?;
    info!(article = id, total, "pins saved");
    Ok(Json(json!({ "success": true, "total": total })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1.5"), None);
    }
}
