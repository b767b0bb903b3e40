//! Installable web app support: `/manifest.json` and `/sw.js`.
//!
//! The service worker caches are named after the build version, so every
//! new binary rolls the cache on the next visit:
//!
//! ```text
//! habitare-0.4.0            precache (home, css, js, manifest)
//! habitare-runtime-0.4.0    everything fetched later
//! ```
//!
//! Non-release builds use `dev@<git hash>`.

use crate::config::BrandConfig;
use serde_json::json;

const SW_TEMPLATE: &str = include_str!("../static/sw.js");
const VERSION_PLACEHOLDER: &str = "__CACHE_VERSION__";

/// Version string baked in by `build.rs`.
pub const BUILD_VERSION: &str = env!("HABITARE_BUILD");

/// Service worker script with the cache version substituted.
pub fn service_worker(version: &str) -> String {
    SW_TEMPLATE.replace(VERSION_PLACEHOLDER, &cache_version(version))
}

/// Cache names must survive as a plain JS string: keep only characters that
/// need no escaping.
fn cache_version(version: &str) -> String {
    version
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '@') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Web app manifest for the public site.
pub fn manifest(brand: &BrandConfig, theme_color: &str, background: &str) -> serde_json::Value {
    json!({
        "name": brand.name,
        "short_name": brand.short_name,
        "description": brand.tagline,
        "lang": "pt-BR",
        "start_url": "/",
        "scope": "/",
        "display": "standalone",
        "background_color": background,
        "theme_color": theme_color,
        "icons": [
            { "src": "/icons/icon-192.png", "sizes": "192x192", "type": "image/png" },
            { "src": "/icons/icon-512.png", "sizes": "512x512", "type": "image/png" }
        ]
    })
}
