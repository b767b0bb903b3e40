//! Shared fixtures for unit tests.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let store = memory_store().await;
//! let id = store.create_article(&draft("Casa", "2024-01-01")).await.unwrap();
//! store.replace_pins(id, &[new_pin("vaso", 10.0, 20.0)]).await.unwrap();
//! ```

use crate::slug::slugify;
use crate::store::Store;
use crate::types::{Article, ArticleDraft, NewPin, ProductPin};

// =========================================================================
// Store fixtures
// =========================================================================

/// A migrated, empty in-memory database.
pub async fn memory_store() -> Store {
    Store::memory().await.expect("in-memory store")
}

/// A minimal article row: slug from the title, three minutes of reading.
pub fn draft(title: &str, published_at: &str) -> ArticleDraft {
    ArticleDraft {
        slug: slugify(title),
        title: title.to_string(),
        subtitle: format!("Sobre {title}"),
        published_at: published_at.to_string(),
        reading_time: 3,
        excerpt: format!("Resumo de {title}"),
        body_html: format!("<p>{title}</p>"),
        ..ArticleDraft::default()
    }
}

/// A pin ready to insert, with the slug doubling as its name.
pub fn new_pin(slug: &str, x: f64, y: f64) -> NewPin {
    NewPin {
        slug: slug.to_string(),
        name: slug.to_string(),
        description: String::new(),
        price_label: "Sob consulta".to_string(),
        x_percent: x,
        y_percent: y,
        cta_path: slug.to_string(),
        tracking_code: format!("utm_content={slug}"),
        badge: "Destaque".to_string(),
    }
}

// =========================================================================
// Row fixtures (no database)
// =========================================================================

/// A fully populated article row dated `2024-08-12`, 8 minutes long.
pub fn sample_article(id: i64, title: &str) -> Article {
    Article {
        id,
        slug: slugify(title),
        title: title.to_string(),
        subtitle: Some(format!("Sobre {title}")),
        category: Some("Residencial".to_string()),
        author: Some("Estúdio Habitare".to_string()),
        author_role: Some("Redação".to_string()),
        published_at: Some("2024-08-12".to_string()),
        reading_time: Some(8),
        hero_image: Some(format!("/uploads/hero-{id}.jpg")),
        hero_caption: None,
        excerpt: Some(format!("Resumo de {title}")),
        body_html: None,
        highlight_quote: None,
        highlight_focus: None,
        highlight_stat_label: None,
        highlight_stat_value: None,
        highlight_stat_helper: None,
    }
}

/// A pin at (10%, 20%) with no explicit call-to-action.
pub fn sample_pin(article_id: i64, slug: &str) -> ProductPin {
    ProductPin {
        id: article_id * 100,
        article_id,
        slug: slug.to_string(),
        name: format!("Produto {slug}"),
        description: Some("Peça em destaque".to_string()),
        price_label: Some("R$ 100".to_string()),
        x_percent: 10.0,
        y_percent: 20.0,
        cta_path: None,
        tracking_code: None,
        badge: Some("Destaque".to_string()),
    }
}
