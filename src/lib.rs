//! # Habitare
//!
//! An editorial magazine with shoppable product pins. Editors write articles
//! in a small back-office, drop pins over the hero image, and readers hover
//! the pins to see the product and follow a tracked link to the shop.
//!
//! # Architecture
//!
//! ```text
//! request → server (routing, gates) → store (SQLite) → views (HTML) | JSON
//!                       ↓
//!        authoring / pins / upload   (form → row transforms)
//!                       ↓
//!              slug / text / tracking (pure text helpers)
//! ```
//!
//! Everything above the store is stateless per request; the only shared
//! state is the connection pool and the session store, both held by
//! [`state::AppState`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`server`] | Axum router, route gates, handlers, graceful shutdown |
//! | [`store`] | SQLite schema and per-entity queries; demo seed |
//! | [`views`] | Maud templates for public and admin pages |
//! | [`authoring`] | Article form → article row, with derived fields and defaults |
//! | [`pins`] | Pin editor payload → pin rows: defaults, slugs, clamped coordinates |
//! | [`upload`] | Streaming multipart uploads with image sniffing |
//! | [`session`] | Signed-cookie sessions over a pluggable [`session::SessionStore`] |
//! | [`tracking`] | Product links with UTM parameters |
//! | [`slug`] | Accent-folding slugs |
//! | [`text`] | HTML stripping, excerpts, reading time |
//! | [`config`] | Layered `habitare.toml` + environment configuration |
//! | [`pwa`] | Web app manifest and versioned service worker |
//! | [`error`] | HTTP error mapping for pages and JSON |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Server-Rendered Pages
//!
//! Pages are rendered with [Maud](https://maud.lambda.xyz/) at request time.
//! Templates are Rust functions, so a missing field is a compile error and
//! interpolation is escaped unless explicitly marked. The only client-side
//! code is small vanilla scripts: popovers, the carousel, the pin editor and
//! the service worker.
//!
//! ## Pins Are Replaced, Not Patched
//!
//! The pin editor always posts the article's full pin set. The store deletes
//! the old set and inserts the new one inside a single transaction, so a
//! failed save leaves the previous pins untouched and there is no per-pin
//! identity to reconcile.
//!
//! ## One SQLite File
//!
//! Articles, sections, images and pins live in one SQLite database with
//! `ON DELETE CASCADE` from articles to everything they own. Uploaded files
//! live on disk under the uploads directory and are referenced by URL.

pub mod authoring;
pub mod config;
pub mod error;
pub mod output;
pub mod pins;
pub mod pwa;
pub mod server;
pub mod session;
pub mod slug;
pub mod state;
pub mod store;
pub mod text;
pub mod tracking;
pub mod types;
pub mod upload;
pub mod views;

#[cfg(test)]
pub(crate) mod test_helpers;
