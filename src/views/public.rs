use super::{Head, base_document, format_date, reading_label, site_footer, site_header};
use crate::config::SiteConfig;
use crate::types::{Article, ArticleImage, ArticleSection, ProductPin};
use maud::{Markup, PreEscaped, html};

/// A pin with its resolved outbound link.
#[derive(Debug, Clone)]
pub struct PinLink {
    pub pin: ProductPin,
    pub href: String,
}

/// An article as listed on the home page.
#[derive(Debug, Clone)]
pub struct ArticleCard {
    pub article: Article,
    pub pins: Vec<PinLink>,
}

/// Everything the article page shows.
pub struct ArticlePage<'a> {
    pub article: &'a Article,
    pub pins: &'a [PinLink],
    pub sections: &'a [ArticleSection],
    pub images: &'a [ArticleImage],
}

fn article_href(article: &Article) -> String {
    format!("/artigos/{}", article.slug)
}

fn meta_line(article: &Article) -> Markup {
    html! {
        @if let Some(category) = &article.category {
            span { (category) }
        }
        @if let Some(date) = &article.published_at {
            " · " time datetime=(date) { (format_date(date)) }
        }
        @if let Some(minutes) = article.reading_time {
            " · " span { (reading_label(minutes)) }
        }
    }
}

/// Hero image with hotspots positioned by percentage.
fn pin_stage(image: Option<&str>, alt: &str, link: Option<&str>, pins: &[PinLink]) -> Markup {
    html! {
        div.pin-stage {
            @if let Some(src) = image {
                @if let Some(href) = link {
                    a href=(href) { img src=(src) alt=(alt) loading="lazy"; }
                } @else {
                    img src=(src) alt=(alt);
                }
            }
            @for p in pins {
                (pin_hotspot(p))
            }
        }
    }
}

fn pin_hotspot(link: &PinLink) -> Markup {
    let pin = &link.pin;
    let position = format!("left:{}%;top:{}%", pin.x_percent, pin.y_percent);
    html! {
        div.pin-container style=(position) data-pin=(pin.slug) {
            button.product-pin type="button" aria-label=(pin.name) {
                span { (pin.name) }
            }
            div.product-popover role="dialog" {
                @if let Some(badge) = &pin.badge {
                    span.product-popover__badge { (badge) }
                }
                h3 { (pin.name) }
                @if let Some(description) = pin.description.as_deref().filter(|d| !d.is_empty()) {
                    p { (description) }
                }
                @if let Some(price) = &pin.price_label {
                    p.product-popover__price { (price) }
                }
                a.product-popover__cta href=(link.href) target="_blank" rel="noopener sponsored" {
                    "Ver produto"
                }
            }
        }
    }
}

fn card(card: &ArticleCard, class: &str) -> Markup {
    let article = &card.article;
    let href = article_href(article);
    html! {
        article class=(class) {
            (pin_stage(article.hero_image.as_deref(), &article.title, Some(&href), &card.pins))
            a.article-card__link href=(href) {
                p.article-card__meta { (meta_line(article)) }
                h2 { (article.title) }
                @if let Some(excerpt) = &article.excerpt {
                    p.article-card__excerpt { (excerpt) }
                }
            }
        }
    }
}

/// Home page. Articles with pins come first; the first article is the hero.
pub fn home(config: &SiteConfig, cards: &[ArticleCard]) -> Markup {
    let title = format!("{} — Arquitetura com alto engajamento", config.brand.name);
    let head = Head::public(&title).describe(&config.brand.tagline);
    let (hero, rest) = match cards.split_first() {
        Some((hero, rest)) => (Some(hero), rest),
        None => (None, cards),
    };

    let content = html! {
        (site_header(config, "/"))
        main.home {
            @if let Some(hero) = hero {
                (card(hero, "hero-card"))
            } @else {
                p.empty-state { "Nenhuma matéria publicada ainda." }
            }
            @if !rest.is_empty() {
                section.article-grid {
                    @for c in rest {
                        (card(c, "article-card"))
                    }
                }
            }
        }
        (site_footer(config))
        script src="/js/main.js" defer {}
    };
    base_document(&head, Some(&config.colors.light.accent), content)
}

/// Full article page.
pub fn article(config: &SiteConfig, page: &ArticlePage) -> Markup {
    let article = page.article;
    let title = format!("{} — {}", article.title, config.brand.name);
    let mut head = Head::public(&title);
    if let Some(subtitle) = &article.subtitle {
        head = head.describe(subtitle);
    }

    let content = html! {
        (site_header(config, ""))
        main.article-page {
            header.article-header {
                p.article-meta { (meta_line(article)) }
                h1 { (article.title) }
                @if let Some(subtitle) = &article.subtitle {
                    p.article-subtitle { (subtitle) }
                }
                @if let Some(author) = &article.author {
                    p.article-byline {
                        "Por " strong { (author) }
                        @if let Some(role) = &article.author_role {
                            ", " (role)
                        }
                    }
                }
            }

            figure.article-hero {
                (pin_stage(article.hero_image.as_deref(), &article.title, None, page.pins))
                @if let Some(caption) = &article.hero_caption {
                    figcaption.hero-caption { (caption) }
                }
            }

            (highlight(article))

            @if let Some(body) = article.body_html.as_deref().filter(|b| !b.is_empty()) {
                div.article-body { (PreEscaped(body)) }
            }

            @for section in page.sections {
                section.article-section data-layout=[section.layout_type.as_deref()] {
                    div {
                        @if let Some(heading) = &section.heading {
                            h2 { (heading) }
                        }
                        @if let Some(text) = &section.content {
                            p { (text) }
                        }
                    }
                    @if let Some(media) = &section.media_url {
                        figure {
                            img src=(media) alt=[section.heading.as_deref()] loading="lazy";
                            @if let Some(caption) = &section.media_caption {
                                figcaption { (caption) }
                            }
                        }
                    }
                }
            }

            @if !page.images.is_empty() {
                section.carousel data-carousel {
                    div.carousel__track data-carousel-track {
                        @for image in page.images {
                            figure {
                                img src=(image.image_url) alt=[image.image_caption.as_deref()] loading="lazy";
                                @if let Some(caption) = &image.image_caption {
                                    figcaption { (caption) }
                                }
                            }
                        }
                    }
                    @if page.images.len() > 1 {
                        div.carousel__nav {
                            button type="button" data-carousel-prev aria-label="Anterior" { "←" }
                            button type="button" data-carousel-next aria-label="Próxima" { "→" }
                        }
                    }
                }
            }
        }
        (site_footer(config))
        script src="/js/main.js" defer {}
    };
    base_document(&head, Some(&config.colors.light.accent), content)
}

fn highlight(article: &Article) -> Markup {
    let has_stat = article.highlight_stat_value.is_some() || article.highlight_stat_label.is_some();
    if article.highlight_quote.is_none() && !has_stat {
        return html! {};
    }
    html! {
        aside.highlight {
            div {
                @if let Some(focus) = &article.highlight_focus {
                    p.article-meta { (focus) }
                }
                @if let Some(quote) = &article.highlight_quote {
                    blockquote { (quote) }
                }
            }
            @if has_stat {
                div.highlight__stat {
                    @if let Some(value) = &article.highlight_stat_value {
                        p.highlight__stat-value { (value) }
                    }
                    @if let Some(label) = &article.highlight_stat_label {
                        p { strong { (label) } }
                    }
                    @if let Some(helper) = &article.highlight_stat_helper {
                        p.article-meta { (helper) }
                    }
                }
            }
        }
    }
}

/// Placeholder for sections that are not live yet.
pub fn coming_soon(config: &SiteConfig) -> Markup {
    let title = format!("Em Desenvolvimento — {}", config.brand.name);
    let head = Head::public(&title)
        .describe("Estamos trabalhando nisso. Em breve você terá acesso a este conteúdo.");
    let content = html! {
        (site_header(config, config.brand.marketplace_url.as_str()))
        main.message-page {
            h1 { "Em desenvolvimento" }
            p { "Estamos trabalhando nisso. Em breve você terá acesso a este conteúdo." }
            p { a.button href="/" { "Voltar para a edição atual" } }
        }
        (site_footer(config))
    };
    base_document(&head, Some(&config.colors.light.accent), content)
}
