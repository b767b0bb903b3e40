use crate::config::TrackingConfig;
use crate::error::AppError;
use crate::state::AppState;
use crate::tracking::tracked_link;
use crate::types::{Article, ProductPin};
use crate::views;
use crate::views::public::{ArticleCard, ArticlePage, PinLink};
use axum::extract::{Path, State};
use axum::response::Html;
use std::collections::HashMap;
use std::sync::Arc;

fn pin_links(pins: Vec<ProductPin>, tracking: &TrackingConfig) -> Vec<PinLink> {
    pins.into_iter()
        .map(|pin| PinLink {
            href: tracked_link(&pin, &tracking.shop_base_url, &tracking.source),
            pin,
        })
        .collect()
}

/// Attach pins to articles and move articles that have pins to the front,
/// keeping date order within each group.
pub fn home_cards(
    articles: Vec<Article>,
    mut pins: HashMap<i64, Vec<ProductPin>>,
    tracking: &TrackingConfig,
) -> Vec<ArticleCard> {
    let mut cards: Vec<ArticleCard> = articles
        .into_iter()
        .map(|article| {
            let pins = pins.remove(&article.id).unwrap_or_default();
            ArticleCard {
                pins: pin_links(pins, tracking),
                article,
            }
        })
        .collect();
    cards.sort_by_key(|card| card.pins.is_empty());
    cards
}

pub async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let articles = state.store.list_articles().await?;
    let pins = state.store.pins_by_article().await?;
    let cards = home_cards(articles, pins, &state.config.tracking);
    Ok(Html(views::public::home(&state.config, &cards).into_string()))
}

pub async fn article(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let store = &state.store;
    let article = store
        .find_article_by_slug(&slug)
        .await?
        .ok_or(AppError::ArticleNotFound(slug))?;

    let pins = pin_links(store.pins_for_article(article.id).await?, &state.config.tracking);
    let sections = store.sections_for_article(article.id).await?;
    let images = store.images_for_article(article.id).await?;

    let page = ArticlePage {
        article: &article,
        pins: &pins,
        sections: &sections,
        images: &images,
    };
    Ok(Html(views::public::article(&state.config, &page).into_string()))
}

pub async fn coming_soon(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::public::coming_soon(&state.config).into_string())
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_article, sample_pin};

    #[test]
    fn articles_with_pins_come_first_in_stable_order() {
        let articles = vec![
            sample_article(1, "Sem pins A"),
            sample_article(2, "Com pins"),
            sample_article(3, "Sem pins B"),
            sample_article(4, "Também com pins"),
        ];
        let mut pins = HashMap::new();
        pins.insert(2, vec![sample_pin(2, "vaso")]);
        pins.insert(4, vec![sample_pin(4, "mesa")]);

        let cards = home_cards(articles, pins, &TrackingConfig::default());
        let ids: Vec<i64> = cards.iter().map(|c| c.article.id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn cards_carry_tracked_links() {
        let cards = home_cards(
            vec![sample_article(2, "Com pins")],
            HashMap::from([(2, vec![sample_pin(2, "vaso")])]),
            &TrackingConfig::default(),
        );
        let href = &cards[0].pins[0].href;
        assert!(href.starts_with("https://loja.habitare.com/produtos/vaso?"));
        assert!(href.contains("utm_content=vaso"));
    }
}
