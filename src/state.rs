use crate::config::{self, SiteConfig};
use crate::pwa;
use crate::session::Sessions;
use crate::store::Store;
use std::sync::Arc;

const CSS_STATIC: &str = include_str!("../static/css/style.css");

/// Shared by every handler.
pub struct AppState {
    pub config: SiteConfig,
    pub store: Store,
    pub sessions: Sessions,
    /// `style.css` with the configured colors prepended.
    pub css: String,
    pub service_worker: String,
}

impl AppState {
    pub fn new(config: SiteConfig, store: Store, sessions: Sessions) -> Arc<Self> {
        let color_css = config::generate_color_css(&config.colors);
        Arc::new(Self {
            css: format!("{color_css}\n\n{CSS_STATIC}"),
            service_worker: pwa::service_worker(pwa::BUILD_VERSION),
            config,
            store,
            sessions,
        })
    }

    /// State with in-memory sessions, as the server runs by default.
    pub fn with_memory_sessions(config: SiteConfig, store: Store) -> Arc<Self> {
        let sessions =
            Sessions::in_memory(&config.auth.session_secret, config.auth.session_ttl_hours);
        Self::new(config, store, sessions)
    }
}
