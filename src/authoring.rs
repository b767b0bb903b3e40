//! Turning the admin article form into stored columns.
//!
//! The editor only types a title and rich body text (plus an optional hero
//! and byline on edit). Everything else is derived:
//!
//! | Column | Source |
//! |--------|--------|
//! | `slug` | slugified title |
//! | `excerpt` | first 200 chars of the tag-stripped body |
//! | `subtitle` | first sentence of the stripped body |
//! | `reading_time` | stripped word count / 120, rounded up, at least 3 |
//! | `highlight_quote` | subtitle, else title |
//! | `highlight_stat_helper` | sentences 2–3 of the stripped body |
//!
//! On create the byline and highlight block get fixed house values. On
//! update, blank form fields keep whatever the article already had.

use crate::slug::{ITEM_PREFIX, slugify_or};
use crate::text::{self, DEFAULT_HELPER, DEFAULT_SUBTITLE};
use crate::types::{Article, ArticleDraft};
use serde::Deserialize;

pub const DEFAULT_CATEGORY: &str = "Edição interativa";
pub const DEFAULT_AUTHOR: &str = "Estúdio Habitare";
pub const DEFAULT_AUTHOR_ROLE: &str = "Conteúdo & ativações";
pub const DEFAULT_HERO_CAPTION: &str = "Imagem enviada pelo editor Habitare";
pub const DEFAULT_HIGHLIGHT_FOCUS: &str = "Pins interativos";
pub const DEFAULT_STAT_LABEL: &str = "Cliques rastreáveis";
pub const DEFAULT_STAT_VALUE: &str = "100%";
pub const DEFAULT_HERO_IMAGE: &str =
    "https://images.unsplash.com/photo-1493666438817-866a91353ca9?auto=format&fit=crop&w=1600&q=80";

/// Text fields of the create/edit article form.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ArticleForm {
    pub title: String,
    pub body_text: String,
    pub hero_image_url: String,
    pub category: String,
    pub author: String,
    pub author_role: String,
}

/// The form is missing a title or body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("title and body text are required")]
pub struct MissingFields;

/// Values derived from the title and body alone.
struct Derived {
    title: String,
    slug: String,
    body_html: String,
    plain: String,
}

impl ArticleForm {
    fn derive(&self) -> Result<Derived, MissingFields> {
        let title = self.title.trim();
        let body = self.body_text.trim();
        if title.is_empty() || body.is_empty() {
            return Err(MissingFields);
        }
        Ok(Derived {
            title: title.to_string(),
            slug: slugify_or(title, ITEM_PREFIX),
            body_html: body.to_string(),
            plain: text::strip_html(body),
        })
    }

    fn hero_url(&self) -> Option<&str> {
        non_blank(&self.hero_image_url)
    }
}

/// Build the row for a new article.
///
/// `uploaded_hero` is the public URL of an uploaded hero file, which wins
/// over the typed URL. `today` is `YYYY-MM-DD`.
pub fn draft_for_create(
    form: &ArticleForm,
    uploaded_hero: Option<&str>,
    today: &str,
) -> Result<ArticleDraft, MissingFields> {
    let d = form.derive()?;
    let subtitle = text::first_sentence(&d.plain, DEFAULT_SUBTITLE).to_string();
    let hero_image = uploaded_hero
        .or_else(|| form.hero_url())
        .unwrap_or(DEFAULT_HERO_IMAGE)
        .to_string();

    Ok(ArticleDraft {
        highlight_quote: quote(&subtitle, &d.title),
        highlight_stat_helper: text::helper_text(&d.plain, DEFAULT_HELPER),
        excerpt: text::excerpt(&d.plain),
        reading_time: text::reading_time(&d.plain),
        category: DEFAULT_CATEGORY.to_string(),
        author: DEFAULT_AUTHOR.to_string(),
        author_role: DEFAULT_AUTHOR_ROLE.to_string(),
        published_at: today.to_string(),
        hero_image,
        hero_caption: DEFAULT_HERO_CAPTION.to_string(),
        highlight_focus: DEFAULT_HIGHLIGHT_FOCUS.to_string(),
        highlight_stat_label: DEFAULT_STAT_LABEL.to_string(),
        highlight_stat_value: DEFAULT_STAT_VALUE.to_string(),
        subtitle,
        slug: d.slug,
        title: d.title,
        body_html: d.body_html,
    })
}

/// Build the replacement row for `existing`.
///
/// Byline fields, hero and subtitle fall back to the stored values. The
/// publication date and highlight labels are never changed by an edit.
pub fn draft_for_update(
    form: &ArticleForm,
    uploaded_hero: Option<&str>,
    existing: &Article,
) -> Result<ArticleDraft, MissingFields> {
    let d = form.derive()?;
    let subtitle_fallback = existing.subtitle.as_deref().unwrap_or(DEFAULT_SUBTITLE);
    let subtitle = text::first_sentence(&d.plain, subtitle_fallback).to_string();

    let keep = |field: &str, current: &Option<String>, default: &str| {
        non_blank(field)
            .or(current.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(default)
            .to_string()
    };
    let stored = |value: &Option<String>| value.clone().unwrap_or_default();

    let hero_image = uploaded_hero
        .or_else(|| form.hero_url())
        .or(existing.hero_image.as_deref())
        .unwrap_or(DEFAULT_HERO_IMAGE)
        .to_string();

    Ok(ArticleDraft {
        highlight_quote: quote(&subtitle, &d.title),
        highlight_stat_helper: text::helper_text(&d.plain, DEFAULT_HELPER),
        excerpt: text::excerpt(&d.plain),
        reading_time: text::reading_time(&d.plain),
        category: keep(&form.category, &existing.category, DEFAULT_CATEGORY),
        author: keep(&form.author, &existing.author, DEFAULT_AUTHOR),
        author_role: keep(&form.author_role, &existing.author_role, DEFAULT_AUTHOR_ROLE),
        published_at: stored(&existing.published_at),
        hero_image,
        hero_caption: stored(&existing.hero_caption),
        highlight_focus: stored(&existing.highlight_focus),
        highlight_stat_label: stored(&existing.highlight_stat_label),
        highlight_stat_value: stored(&existing.highlight_stat_value),
        subtitle,
        slug: d.slug,
        title: d.title,
        body_html: d.body_html,
    })
}

fn quote(subtitle: &str, title: &str) -> String {
    let quote = if subtitle.is_empty() { title } else { subtitle };
    quote.to_string()
}

fn non_blank(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|s| !s.is_empty())
}
