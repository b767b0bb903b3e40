//! Entity types shared by the store, the views and the JSON API.
//!
//! Row types derive `sqlx::FromRow` and `Serialize`; the API returns them
//! verbatim, so field names double as the public JSON schema.

use serde::{Deserialize, Serialize};

/// A magazine article. Owns its sections, images and pins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub author_role: Option<String>,
    /// `YYYY-MM-DD`
    pub published_at: Option<String>,
    pub reading_time: Option<i64>,
    pub hero_image: Option<String>,
    pub hero_caption: Option<String>,
    pub excerpt: Option<String>,
    pub body_html: Option<String>,
    pub highlight_quote: Option<String>,
    pub highlight_focus: Option<String>,
    pub highlight_stat_label: Option<String>,
    pub highlight_stat_value: Option<String>,
    pub highlight_stat_helper: Option<String>,
}

/// Column values for inserting or updating an article.
///
/// Built by [`crate::authoring`] from a submitted form; the store writes it
/// as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleDraft {
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub category: String,
    pub author: String,
    pub author_role: String,
    pub published_at: String,
    pub reading_time: u32,
    pub hero_image: String,
    pub hero_caption: String,
    pub excerpt: String,
    pub body_html: String,
    pub highlight_quote: String,
    pub highlight_focus: String,
    pub highlight_stat_label: String,
    pub highlight_stat_value: String,
    pub highlight_stat_helper: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArticleSection {
    pub id: i64,
    pub article_id: i64,
    pub heading: Option<String>,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_caption: Option<String>,
    pub sort_order: i64,
    pub layout_type: Option<String>,
}

/// Carousel image attached to an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArticleImage {
    pub id: i64,
    pub article_id: i64,
    pub image_url: String,
    pub image_caption: Option<String>,
    pub sort_order: i64,
}

/// A product hotspot positioned over an article's hero image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductPin {
    pub id: i64,
    pub article_id: i64,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price_label: Option<String>,
    /// Horizontal position over the hero image, 0–100.
    pub x_percent: f64,
    /// Vertical position over the hero image, 0–100.
    pub y_percent: f64,
    pub cta_path: Option<String>,
    pub tracking_code: Option<String>,
    pub badge: Option<String>,
}

/// A pin ready to be written: slug resolved, defaults applied, coordinates
/// clamped. See [`crate::pins::normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPin {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price_label: String,
    pub x_percent: f64,
    pub y_percent: f64,
    pub cta_path: String,
    pub tracking_code: String,
    pub badge: String,
}

/// A section to insert (used by the demo seed).
#[derive(Debug, Clone, PartialEq)]
pub struct NewSection {
    pub heading: String,
    pub content: String,
    pub media_url: Option<String>,
    pub media_caption: Option<String>,
    pub sort_order: i64,
    pub layout_type: String,
}
