//! HTTP server: routing, middleware and process lifecycle.
//!
//! Three route groups share one [`AppState`]:
//!
//! | Group | Prefix | Gate |
//! |-------|--------|------|
//! | public pages, assets, uploads | `/` | none |
//! | back-office | `/admin` | session cookie ([`auth::require_admin`]) |
//! | read API | `/api` | API key ([`auth::require_api_key`]), except `/api/doc` |
//!
//! `/admin/login`, `/admin/logout` and `/admin/check-auth` sit outside the
//! session gate.

mod admin;
mod api;
mod assets;
mod auth;
mod public;

use crate::config::SiteConfig;
use crate::state::AppState;
use crate::store::{Store, StoreError};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::handler::HandlerWithoutStateExt;
use axum::routing::{get, post};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Request body cap for the multipart article forms (hero plus 20 photos).
const UPLOAD_BODY_LIMIT: usize = 256 * 1024 * 1024;

const DEFAULT_LOG_FILTER: &str = "habitare=info,tower_http=info";

/// Path value that selects a throwaway in-memory database.
pub const MEMORY_DATABASE: &str = ":memory:";

#[derive(Error, Debug)]
pub enum ServeError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt().with_env_filter(filter).init();
}

/// Open the configured database, in memory for [`MEMORY_DATABASE`].
pub async fn open_store(path: &Path) -> Result<Store, StoreError> {
    if path.as_os_str() == MEMORY_DATABASE {
        Store::memory().await
    } else {
        Store::open(path).await
    }
}

/// The full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/admin", get(admin::dashboard))
        .route(
            "/admin/articles",
            post(admin::create_article).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/admin/articles/{id}/edit", get(admin::edit_article))
        .route(
            "/admin/articles/{id}",
            post(admin::update_article)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .delete(admin::delete_article),
        )
        .route(
            "/admin/articles/{id}/pins",
            get(admin::pins_page).post(admin::save_pins),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let session_routes = Router::new()
        .route("/admin/login", get(admin::login_page).post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .route("/admin/check-auth", get(admin::check_auth));

    let api_routes = Router::new()
        .route("/api/articles", get(api::list_articles))
        .route("/api/articles/slug/{slug}", get(api::article_by_slug))
        .route("/api/articles/{id}", get(api::article_by_id))
        .route("/api/articles/{id}/pins", get(api::article_pins))
        .route("/api/articles/{id}/sections", get(api::article_sections))
        .route("/api/articles/{id}/images", get(api::article_images))
        .route("/api/articles/{id}/complete", get(api::article_complete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .route("/api/doc", get(api::doc));

    let public_routes = Router::new()
        .route("/", get(public::home))
        .route("/artigos/{slug}", get(public::article))
        .route("/em-desenvolvimento", get(public::coming_soon))
        .route("/css/style.css", get(assets::style_css))
        .route("/css/admin.css", get(assets::admin_css))
        .route("/js/{file}", get(assets::script))
        .route("/manifest.json", get(assets::manifest))
        .route("/sw.js", get(assets::service_worker));

    let uploads = ServeDir::new(&state.config.paths.uploads);
    let public_dir = ServeDir::new(&state.config.paths.public_dir)
        .fallback(public::not_found.into_service());

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .merge(api_routes)
        .nest_service("/uploads", uploads)
        .fallback_service(public_dir)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the store, bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: SiteConfig) -> Result<(), ServeError> {
    config.warn_on_stock_secrets();
    let store = open_store(&config.paths.database).await?;
    tokio::fs::create_dir_all(&config.paths.uploads).await?;

    let address = config.bind_address();
    let state = AppState::with_memory_sessions(config, store.clone());
    let app = router(state);

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
