//! Server-rendered HTML.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Every interpolation is escaped unless wrapped in `PreEscaped`, which is
//! reserved for the editor's `body_html` and the inline pin data.
//!
//! - [`public`]: home, article, coming-soon
//! - [`admin`]: login, dashboard, article editor, pin editor
//!
//! Stylesheets and scripts are not inlined; pages link `/css/*` and `/js/*`
//! so the service worker can cache them.

pub mod admin;
pub mod public;

use crate::config::SiteConfig;
use chrono::{Datelike, NaiveDate};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;

const MONTHS: [&str; 12] = [
    "jan.", "fev.", "mar.", "abr.", "mai.", "jun.", "jul.", "ago.", "set.", "out.", "nov.", "dez.",
];

/// `2024-08-12` → `12 de ago. de 2024`. Unparseable input is returned as-is.
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => format!(
            "{:02} de {} de {}",
            d.day(),
            MONTHS[d.month0() as usize],
            d.year()
        ),
        Err(_) => date.to_string(),
    }
}

pub fn reading_label(minutes: i64) -> String {
    format!("{minutes} min de leitura")
}

/// Serialize `value` for embedding inside a `<script>` element.
///
/// `</` is escaped so a string containing `</script>` cannot close the tag.
pub fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

// ============================================================================
// Page chrome
// ============================================================================

/// Per-page head settings.
pub struct Head<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub body_class: Option<&'a str>,
    /// Admin pages load `admin.css` and unregister the service worker.
    pub admin: bool,
}

impl<'a> Head<'a> {
    pub fn public(title: &'a str) -> Self {
        Self {
            title,
            description: None,
            body_class: None,
            admin: false,
        }
    }

    pub fn admin(title: &'a str) -> Self {
        Self {
            title,
            description: None,
            body_class: Some("admin-page"),
            admin: true,
        }
    }

    pub fn describe(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }
}

/// Renders the base HTML document structure
pub fn base_document(head: &Head, theme_color: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (head.title) }
                @if let Some(description) = head.description {
                    meta name="description" content=(description);
                }
                @if let Some(color) = theme_color {
                    meta name="theme-color" content=(color);
                }
                link rel="stylesheet" href="/css/style.css";
                @if head.admin {
                    link rel="stylesheet" href="/css/admin.css";
                    script src="/js/admin-disable-sw.js" {}
                } @else {
                    link rel="manifest" href="/manifest.json";
                    link rel="apple-touch-icon" href="/icons/icon-192.png";
                }
            }
            body class=[head.body_class] {
                (content)
                @if !head.admin {
                    script src="/js/pwa-register.js" defer {}
                }
            }
        }
    }
}

/// Site header with brand, tagline and navigation.
pub fn site_header(config: &SiteConfig, current_path: &str) -> Markup {
    let brand = &config.brand;
    html! {
        header.site-header {
            div {
                a.site-brand href="/" { (brand.name) }
                p.site-tagline { (brand.tagline) }
            }
            nav.site-nav {
                (render_nav(config, current_path))
            }
        }
    }
}

/// Renders the navigation menu
pub fn render_nav(config: &SiteConfig, current_path: &str) -> Markup {
    let items = [
        ("Edição atual", "/"),
        ("Marketplace", config.brand.marketplace_url.as_str()),
        ("Instagram", config.brand.instagram_url.as_str()),
    ];
    html! {
        ul {
            @for (label, href) in items {
                @let is_current = href == current_path;
                @let external = href.starts_with("http");
                li class=[is_current.then_some("current")] {
                    @if external {
                        a href=(href) target="_blank" rel="noopener" { (label) }
                    } @else {
                        a href=(href) { (label) }
                    }
                }
            }
        }
    }
}

pub fn site_footer(config: &SiteConfig) -> Markup {
    html! {
        footer.site-footer {
            p { (config.brand.name) " · " (config.brand.tagline) }
        }
    }
}

/// A standalone title + message page, used for errors.
///
/// Rendered without site chrome so it works whatever went wrong.
pub fn message_page(title: &str, message: &str) -> Markup {
    let content = html! {
        main.message-page {
            h1 { (title) }
            p { (message) }
            p { a.button href="/" { "Voltar para a edição atual" } }
        }
    };
    base_document(&Head::public(title), None, content)
}

/// Inline `<script>` assigning `window.<name>`.
pub fn inline_data<T: Serialize>(name: &str, value: &T) -> Markup {
    html! {
        script {
            (PreEscaped(format!("window.{name} = {};", script_json(value))))
        }
    }
}
