//! Demo content for a fresh database.
//!
//! The data lives in `seed.toml` next to this file and is embedded at
//! compile time. Seeding only runs against an empty `articles` table.

use super::{Store, StoreError};
use crate::pins::clamp_percent;
use crate::types::{ArticleDraft, NewPin, NewSection};
use serde::Deserialize;
use tracing::info;

const SEED_TOML: &str = include_str!("seed.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedFile {
    articles: Vec<SeedArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedArticle {
    slug: String,
    title: String,
    subtitle: String,
    category: String,
    author: String,
    author_role: String,
    published_at: String,
    reading_time: u32,
    hero_image: String,
    hero_caption: String,
    excerpt: String,
    highlight_quote: String,
    highlight_focus: String,
    highlight_stat_label: String,
    highlight_stat_value: String,
    highlight_stat_helper: String,
    #[serde(default)]
    sections: Vec<SeedSection>,
    #[serde(default)]
    pins: Vec<SeedPin>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedSection {
    heading: String,
    content: String,
    media_url: Option<String>,
    media_caption: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedPin {
    slug: String,
    name: String,
    description: String,
    price_label: String,
    x_percent: f64,
    y_percent: f64,
    cta_path: String,
    tracking_code: String,
    badge: String,
}

impl SeedArticle {
    fn draft(&self) -> ArticleDraft {
        ArticleDraft {
            slug: self.slug.clone(),
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            category: self.category.clone(),
            author: self.author.clone(),
            author_role: self.author_role.clone(),
            published_at: self.published_at.clone(),
            reading_time: self.reading_time,
            hero_image: self.hero_image.clone(),
            hero_caption: self.hero_caption.clone(),
            excerpt: self.excerpt.clone(),
            body_html: format!("<p>{}</p>", self.excerpt),
            highlight_quote: self.highlight_quote.clone(),
            highlight_focus: self.highlight_focus.clone(),
            highlight_stat_label: self.highlight_stat_label.clone(),
            highlight_stat_value: self.highlight_stat_value.clone(),
            highlight_stat_helper: self.highlight_stat_helper.clone(),
        }
    }
}

impl From<&SeedPin> for NewPin {
    fn from(pin: &SeedPin) -> Self {
        NewPin {
            slug: pin.slug.clone(),
            name: pin.name.clone(),
            description: pin.description.clone(),
            price_label: pin.price_label.clone(),
            x_percent: clamp_percent(pin.x_percent),
            y_percent: clamp_percent(pin.y_percent),
            cta_path: pin.cta_path.clone(),
            tracking_code: pin.tracking_code.clone(),
            badge: pin.badge.clone(),
        }
    }
}

/// Summary of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub articles: usize,
    pub sections: usize,
    pub pins: usize,
}

/// Load the demo articles, sections and pins into `store`.
///
/// Returns `None` without touching anything when articles already exist.
pub async fn seed(store: &Store) -> Result<Option<SeedReport>, StoreError> {
    if store.count_articles().await? > 0 {
        info!("database already has articles, skipping seed");
        return Ok(None);
    }

    let file: SeedFile = toml::from_str(SEED_TOML)?;
    let mut report = SeedReport::default();

    for article in &file.articles {
        let id = store.create_article(&article.draft()).await?;
        report.articles += 1;

        for (idx, section) in article.sections.iter().enumerate() {
            let section = NewSection {
                heading: section.heading.clone(),
                content: section.content.clone(),
                media_url: section.media_url.clone(),
                media_caption: section.media_caption.clone(),
                sort_order: idx as i64 + 1,
                layout_type: "text".to_string(),
            };
            store.add_section(id, &section).await?;
            report.sections += 1;
        }

        let pins: Vec<NewPin> = article.pins.iter().map(NewPin::from).collect();
        report.pins += store.replace_pins(id, &pins).await?;
    }

    info!(
        articles = report.articles,
        sections = report.sections,
        pins = report.pins,
        "seeded demo content"
    );
    Ok(Some(report))
}
