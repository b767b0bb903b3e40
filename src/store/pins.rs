use super::{Store, StoreError};
use crate::pins::disambiguate;
use crate::types::{NewPin, ProductPin};
use std::collections::{HashMap, HashSet};
use tracing::info;

impl Store {
    pub async fn pins_for_article(&self, article_id: i64) -> Result<Vec<ProductPin>, StoreError> {
        Ok(sqlx::query_as::<_, ProductPin>(
            "SELECT * FROM product_pins WHERE article_id = ? ORDER BY id ASC",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Every pin, grouped by article id.
    pub async fn pins_by_article(&self) -> Result<HashMap<i64, Vec<ProductPin>>, StoreError> {
        let pins = sqlx::query_as::<_, ProductPin>(
            "SELECT * FROM product_pins ORDER BY article_id ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<ProductPin>> = HashMap::new();
        for pin in pins {
            grouped.entry(pin.article_id).or_default().push(pin);
        }
        Ok(grouped)
    }

    /// Replace the full pin set of an article and return how many were saved.
    ///
    /// Runs in one transaction: the article is checked first, the old pins
    /// are deleted, then the new ones inserted. Any failure rolls back to the
    /// previous set. Slugs already used by another article's pins, or earlier
    /// in the same batch, get a `-2`, `-3`, … suffix.
    pub async fn replace_pins(&self, article_id: i64, pins: &[NewPin]) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM articles WHERE id = ?")
            .bind(article_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::ArticleNotFound(article_id));
        }

        sqlx::query("DELETE FROM product_pins WHERE article_id = ?")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;

        let mut taken: HashSet<String> = sqlx::query_scalar::<_, String>("SELECT slug FROM product_pins")
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();

        for pin in pins {
            let slug = disambiguate(&pin.slug, |s| taken.contains(s));
            sqlx::query(
                "INSERT INTO product_pins (
                    article_id, slug, name, description, price_label,
                    x_percent, y_percent, cta_path, tracking_code, badge
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(article_id)
            .bind(&slug)
            .bind(&pin.name)
            .bind(&pin.description)
            .bind(&pin.price_label)
            .bind(pin.x_percent)
            .bind(pin.y_percent)
            .bind(&pin.cta_path)
            .bind(&pin.tracking_code)
            .bind(&pin.badge)
            .execute(&mut *tx)
            .await?;
            taken.insert(slug);
        }

        tx.commit().await?;
        info!(article_id, count = pins.len(), "pins replaced");
        Ok(pins.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{draft, memory_store, new_pin};

    #[tokio::test]
    async fn replace_swaps_the_whole_set() {
        let store = memory_store().await;
        let id = store.create_article(&draft("Casa", "2024-01-01")).await.unwrap();

        store
            .replace_pins(id, &[new_pin("vaso", 10.0, 10.0), new_pin("mesa", 20.0, 20.0)])
            .await
            .unwrap();
        let saved = store.replace_pins(id, &[new_pin("sofa", 30.0, 40.0)]).await.unwrap();
        assert_eq!(saved, 1);

        let pins = store.pins_for_article(id).await.unwrap();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].slug, "sofa");
        assert_eq!((pins[0].x_percent, pins[0].y_percent), (30.0, 40.0));
    }

    #[tokio::test]
    async fn empty_set_clears_pins() {
        let store = memory_store().await;
        let id = store.create_article(&draft("Casa", "2024-01-01")).await.unwrap();
        store.replace_pins(id, &[new_pin("vaso", 1.0, 1.0)]).await.unwrap();

        assert_eq!(store.replace_pins(id, &[]).await.unwrap(), 0);
        assert!(store.pins_for_article(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_article_is_rejected() {
        let store = memory_store().await;
        let err = store.replace_pins(7, &[new_pin("vaso", 1.0, 1.0)]).await.unwrap_err();
        assert!(matches!(err, StoreError::ArticleNotFound(7)));
    }

    #[tokio::test]
    async fn resaving_keeps_own_slugs() {
        let store = memory_store().await;
        let id = store.create_article(&draft("Casa", "2024-01-01")).await.unwrap();
        store.replace_pins(id, &[new_pin("vaso", 1.0, 1.0)]).await.unwrap();
        store.replace_pins(id, &[new_pin("vaso", 2.0, 2.0)]).await.unwrap();

        assert_eq!(store.pins_for_article(id).await.unwrap()[0].slug, "vaso");
    }

    #[tokio::test]
    async fn conflicting_slugs_are_suffixed() {
        let store = memory_store().await;
        let first = store.create_article(&draft("Casa", "2024-01-01")).await.unwrap();
        let second = store.create_article(&draft("Galeria", "2024-01-02")).await.unwrap();
        store.replace_pins(first, &[new_pin("vaso", 1.0, 1.0)]).await.unwrap();

        store
            .replace_pins(second, &[new_pin("vaso", 1.0, 1.0), new_pin("vaso", 2.0, 2.0)])
            .await
            .unwrap();

        let slugs: Vec<_> = store
            .pins_for_article(second)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, ["vaso-2", "vaso-3"]);
    }

    #[tokio::test]
    async fn pins_by_article_groups_rows() {
        let store = memory_store().await;
        let a = store.create_article(&draft("A", "2024-01-01")).await.unwrap();
        let b = store.create_article(&draft("B", "2024-01-02")).await.unwrap();
        store.replace_pins(a, &[new_pin("um", 1.0, 1.0), new_pin("dois", 1.0, 1.0)]).await.unwrap();
        store.replace_pins(b, &[new_pin("tres", 1.0, 1.0)]).await.unwrap();

        let grouped = store.pins_by_article().await.unwrap();
        assert_eq!(grouped[&a].len(), 2);
        assert_eq!(grouped[&b].len(), 1);
    }

    #[tokio::test]
    async fn failed_insert_keeps_previous_set() {
        let store = memory_store().await;
        let id = store.create_article(&draft("Casa", "2024-01-01")).await.unwrap();
        store
            .replace_pins(id, &[new_pin("vaso", 10.0, 10.0), new_pin("mesa", 20.0, 20.0)])
            .await
            .unwrap();
        sqlx::raw_sql(
            "CREATE TRIGGER reject_pin BEFORE INSERT ON product_pins
             WHEN NEW.slug = 'quebrado'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let err = store
            .replace_pins(id, &[new_pin("sofa", 1.0, 1.0), new_pin("quebrado", 2.0, 2.0)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));

        let slugs: Vec<_> = store
            .pins_for_article(id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, ["vaso", "mesa"]);
    }
}
