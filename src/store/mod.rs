//! SQLite persistence.
//!
//! One database file holds four tables. Every child row belongs to exactly
//! one article and is removed with it (`ON DELETE CASCADE`, with
//! `foreign_keys` enabled on every connection):
//!
//! ```text
//! articles
//! ├── article_sections   ordered by sort_order
//! ├── article_images     ordered by sort_order
//! └── product_pins       ordered by id, slug unique across all articles
//! ```
//!
//! [`Store`] is a cheap clone around the connection pool. Queries are grouped
//! by entity in the submodules, all as inherent methods on `Store`.

mod articles;
mod images;
mod pins;
pub mod seed;
mod sections;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("article {0} not found")]
    ArticleNotFound(i64),
    #[error("an article with slug {0:?} already exists")]
    DuplicateSlug(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("seed data error: {0}")]
    Seed(#[from] toml::de::Error),
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY,
    slug TEXT UNIQUE NOT NULL,
    title TEXT NOT NULL,
    subtitle TEXT,
    category TEXT,
    author TEXT,
    author_role TEXT,
    published_at TEXT,
    reading_time INTEGER,
    hero_image TEXT,
    hero_caption TEXT,
    excerpt TEXT,
    body_html TEXT,
    highlight_quote TEXT,
    highlight_focus TEXT,
    highlight_stat_label TEXT,
    highlight_stat_value TEXT,
    highlight_stat_helper TEXT
);

CREATE TABLE IF NOT EXISTS article_sections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
    heading TEXT,
    content TEXT,
    media_url TEXT,
    media_caption TEXT,
    sort_order INTEGER NOT NULL DEFAULT 0,
    layout_type TEXT DEFAULT 'text'
);

CREATE TABLE IF NOT EXISTS article_images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
    image_url TEXT NOT NULL,
    image_caption TEXT,
    sort_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS product_pins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
    slug TEXT UNIQUE NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    price_label TEXT,
    x_percent REAL NOT NULL DEFAULT 0,
    y_percent REAL NOT NULL DEFAULT 0,
    cta_path TEXT,
    tracking_code TEXT,
    badge TEXT
);

CREATE INDEX IF NOT EXISTS idx_sections_article ON article_sections(article_id);
CREATE INDEX IF NOT EXISTS idx_images_article ON article_images(article_id);
CREATE INDEX IF NOT EXISTS idx_pins_article ON product_pins(article_id);
"#;

#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database file at `path` and apply the
    /// schema.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        info!(path = %path.display(), "opened database");
        Self::with_pool(pool).await
    }

    /// A private in-memory database. Used by tests and `--database :memory:`.
    ///
    /// Each SQLite memory connection is its own database, so the pool is held
    /// at a single connection that never expires.
    pub async fn memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create missing tables and indexes. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        debug!("schema applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Map a unique-constraint failure on an article slug to
/// [`StoreError::DuplicateSlug`].
fn slug_conflict(err: sqlx::Error, slug: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateSlug(slug.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn open_creates_file_and_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/habitare.db");
        let store = Store::open(&path).await.unwrap();
        assert!(path.exists());
        store.close().await;
    }

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let store = Store::memory().await.unwrap();
        store.migrate().await.unwrap();
        store.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let store = Store::memory().await.unwrap();
        let result = sqlx::query("INSERT INTO article_images (article_id, image_url) VALUES (999, 'x')")
            .execute(store.pool())
            .await;
        assert!(result.is_err());
    }
}
