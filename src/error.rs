//! HTTP error mapping.
//!
//! Browser routes fail with [`AppError`], rendered as an HTML message page.
//! The API and the admin AJAX endpoints fail with [`ApiError`], rendered as
//! `{"error": ..., "message": ...}`.
//!
//! | Error | Status |
//! |-------|--------|
//! | missing form fields, duplicate slug, bad upload, bad pin payload | 400 |
//! | missing or wrong API key | 401 |
//! | unknown route, article or id | 404 |
//! | database or IO failure | 500 (logged) |

use crate::authoring::MissingFields;
use crate::store::StoreError;
use crate::upload::UploadError;
use crate::views;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("page not found")]
    NotFound,
    #[error("article {0:?} not found")]
    ArticleNotFound(String),
    #[error("article {0} not found for editing")]
    EditTargetNotFound(i64),
    #[error(transparent)]
    MissingFields(#[from] MissingFields),
    #[error("an article with slug {0:?} already exists")]
    DuplicateSlug(String),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ArticleNotFound(id) => AppError::EditTargetNotFound(id),
            StoreError::DuplicateSlug(slug) => AppError::DuplicateSlug(slug),
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound | AppError::ArticleNotFound(_) | AppError::EditTargetNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::MissingFields(_) | AppError::DuplicateSlug(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(UploadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Page title and message shown to the visitor.
    fn page(&self) -> (&'static str, &'static str) {
        match self {
            AppError::NotFound => (
                "404 — Página não encontrada",
                "Nada por aqui. Que tal voltar para a edição atual?",
            ),
            AppError::ArticleNotFound(_) => (
                "Conteúdo não encontrado",
                "O artigo que você procura saiu do ar ou mudou de endereço.",
            ),
            AppError::EditTargetNotFound(_) => (
                "Artigo não encontrado",
                "Não encontramos este artigo para edição.",
            ),
            AppError::MissingFields(_) => (
                "Dados inválidos",
                "Preencha título e texto da matéria para publicar.",
            ),
            AppError::DuplicateSlug(_) => (
                "Slug duplicado",
                "Já existe um artigo com este título. Tente outro nome.",
            ),
            AppError::Upload(UploadError::Io(_)) | AppError::Store(_) => (
                "Erro inesperado",
                "Algo saiu do roteiro. Atualize a página ou tente novamente.",
            ),
            AppError::Upload(_) => (
                "Upload inválido",
                "Envie imagens JPG, PNG, WebP, GIF ou AVIF, com no máximo 20 fotos por matéria.",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let (title, message) = self.page();
        (status, Html(views::message_page(title, message).into_string())).into_response()
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("missing or invalid API key")]
    Unauthorized,
    /// Unknown article id. Holds the id as it appeared in the path.
    #[error("no article with id {0}")]
    ArticleId(String),
    #[error("no article with slug {0:?}")]
    ArticleSlug(String),
    /// The pin editor sent a body that is not a JSON object.
    #[error("unreadable pin payload: {0}")]
    PinPayload(String),
    /// A failure while saving pins from the editor.
    #[error("saving pins failed: {0}")]
    PinSave(StoreError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ArticleNotFound(id) => ApiError::ArticleId(id.to_string()),
            other => ApiError::Store(other),
        }
    }
}

impl ApiError {
    /// Wrap a store error from the pin editor endpoint.
    pub fn pins(err: StoreError) -> Self {
        match err {
            StoreError::ArticleNotFound(id) => ApiError::ArticleId(id.to_string()),
            other => ApiError::PinSave(other),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::ArticleId(_) | ApiError::ArticleSlug(_) => StatusCode::NOT_FOUND,
            ApiError::PinPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::PinSave(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ApiError::Unauthorized => json!({
                "error": "Não autorizado",
                "message": "API key inválida ou ausente. Use o header X-API-Key ou o parâmetro api_key.",
            }),
            ApiError::ArticleId(id) => json!({
                "error": "Artigo não encontrado",
                "message": format!("Nenhum artigo encontrado com o ID {id}"),
            }),
            ApiError::ArticleSlug(slug) => json!({
                "error": "Artigo não encontrado",
                "message": format!("Nenhum artigo encontrado com o slug \"{slug}\""),
            }),
            ApiError::PinPayload(reason) => json!({
                "error": "Dados de pins inválidos",
                "message": reason,
            }),
            ApiError::PinSave(_) => json!({ "error": "Erro interno ao processar pins." }),
            ApiError::Store(_) => json!({
                "error": "Erro interno",
                "message": "Não foi possível concluir a operação.",
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_page_statuses() {
        assert_eq!(
            AppError::from(StoreError::ArticleNotFound(3)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StoreError::DuplicateSlug("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(StoreError::Database(sqlx::Error::PoolClosed)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upload_errors_are_client_errors_except_io() {
        let bad = AppError::from(UploadError::NotAnImage("a.txt".into()));
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        let io = AppError::from(UploadError::Io(std::io::Error::other("disk")));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn api_not_found_message_names_the_id() {
        let err = ApiError::from(StoreError::ArticleNotFound(42));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.body()["message"],
            "Nenhum artigo encontrado com o ID 42"
        );
    }

    #[test]
    fn pin_save_failure_uses_editor_message() {
        let err = ApiError::pins(StoreError::Database(sqlx::Error::PoolClosed));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body()["error"], "Erro interno ao processar pins.");
    }

    #[test]
    fn unauthorized_body() {
        let body = ApiError::Unauthorized.body();
        assert_eq!(body["error"], "Não autorizado");
    }
}
