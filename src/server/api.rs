//! Read-only JSON API.
//!
//! Row types serialize as-is, so the field names here are the public schema.
//! Every handler except [`doc`] runs behind `require_api_key`.

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::Store;
use crate::types::Article;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::http::header::HOST;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

async fn article_or_404(store: &Store, raw_id: &str) -> Result<Article, ApiError> {
    let not_found = || ApiError::ArticleId(raw_id.to_string());
    let id: i64 = raw_id.trim().parse().map_err(|_| not_found())?;
    store.find_article(id).await?.ok_or_else(not_found)
}

#[derive(Debug, Default, Deserialize)]
pub struct Page {
    limit: Option<String>,
    offset: Option<String>,
}

impl Page {
    /// `(limit, offset)` against `total` rows. A missing, zero, negative or
    /// non-numeric limit means everything; a bad offset means 0.
    fn resolve(&self, total: i64) -> (i64, i64) {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        let limit = parse(&self.limit).filter(|n| *n > 0).unwrap_or(total);
        let offset = parse(&self.offset).filter(|n| *n > 0).unwrap_or(0);
        (limit, offset)
    }
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Page>,
) -> Result<Json<Value>, ApiError> {
    let total = state.store.count_articles().await?;
    let (limit, offset) = page.resolve(total);
    let articles = state.store.list_articles_page(limit, offset).await?;
    Ok(Json(json!({
        "total": total,
        "limit": limit,
        "offset": offset,
        "count": articles.len(),
        "articles": articles,
    })))
}

pub async fn article_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(article_or_404(&state.store, &id).await?))
}

pub async fn article_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Article>, ApiError> {
    state
        .store
        .find_article_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or(ApiError::ArticleSlug(slug))
}

pub async fn article_pins(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let article = article_or_404(&state.store, &id).await?;
    let pins = state.store.pins_for_article(article.id).await?;
    Ok(Json(json!({
        "article_id": article.id,
        "count": pins.len(),
        "pins": pins,
    })))
}

pub async fn article_sections(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let article = article_or_404(&state.store, &id).await?;
    let sections = state.store.sections_for_article(article.id).await?;
    Ok(Json(json!({
        "article_id": article.id,
        "count": sections.len(),
        "sections": sections,
    })))
}

pub async fn article_images(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let article = article_or_404(&state.store, &id).await?;
    let images = state.store.images_for_article(article.id).await?;
    Ok(Json(json!({
        "article_id": article.id,
        "count": images.len(),
        "images": images,
    })))
}

pub async fn article_complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = &state.store;
    let article = article_or_404(store, &id).await?;
    let (pins, sections, images) = tokio::try_join!(
        store.pins_for_article(article.id),
        store.sections_for_article(article.id),
        store.images_for_article(article.id),
    )?;
    Ok(Json(json!({
        "counts": {
            "pins": pins.len(),
            "sections": sections.len(),
            "images": images.len(),
        },
        "article": article,
        "pins": pins,
        "sections": sections,
        "images": images,
    })))
}

/// Self-description of the API. Needs no key.
pub async fn doc(headers: HeaderMap) -> Json<Value> {
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    Json(documentation(&format!("http://{host}/api")))
}

fn documentation(base_url: &str) -> Value {
    let endpoint = |description: &str, path: &str| {
        json!({
            "description": description,
            "authentication": true,
            "example": format!("{base_url}{path}?api_key=YOUR_KEY"),
        })
    };
    json!({
        "title": "API Revista Habitare",
        "version": "1.0.0",
        "description": "API REST para acessar artigos, pins, seções e imagens da Revista Habitare",
        "authentication": {
            "type": "API Key",
            "methods": [
                "Header: X-API-Key",
                "Query parameter: ?api_key=YOUR_KEY",
                "Body parameter: api_key (JSON ou formulário)"
            ],
        },
        "baseUrl": base_url,
        "endpoints": {
            "GET /articles": {
                "description": "Lista todos os artigos, mais recentes primeiro",
                "authentication": true,
                "queryParams": {
                    "limit": "Número máximo de resultados (opcional)",
                    "offset": "Número de resultados para pular (opcional)"
                },
                "example": format!("{base_url}/articles?api_key=YOUR_KEY"),
                "response": "{ total, limit, offset, count, articles }",
            },
            "GET /articles/{id}": endpoint("Busca um artigo por ID", "/articles/1"),
            "GET /articles/slug/{slug}": endpoint(
                "Busca um artigo por slug",
                "/articles/slug/casa-observatorio-mata-atlantica"
            ),
            "GET /articles/{id}/pins": endpoint("Lista os pins de um artigo", "/articles/1/pins"),
            "GET /articles/{id}/sections": endpoint("Lista as seções de um artigo", "/articles/1/sections"),
            "GET /articles/{id}/images": endpoint("Lista as imagens de um artigo", "/articles/1/images"),
            "GET /articles/{id}/complete": endpoint(
                "Artigo com pins, seções, imagens e contagens",
                "/articles/1/complete"
            ),
        },
        "examples": {
            "curl": format!("curl -H \"X-API-Key: YOUR_KEY\" {base_url}/articles"),
        },
        "errorCodes": {
            "401": "Não autorizado - API key inválida ou ausente",
            "404": "Recurso não encontrado",
            "500": "Erro interno do servidor"
        }
    })
}
