use super::{Store, StoreError};
use crate::types::ArticleImage;
use sqlx::SqliteConnection;

impl Store {
    pub async fn images_for_article(&self, article_id: i64) -> Result<Vec<ArticleImage>, StoreError> {
        Ok(sqlx::query_as::<_, ArticleImage>(
            "SELECT * FROM article_images WHERE article_id = ? ORDER BY sort_order ASC, id ASC",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

/// Append carousel images after the article's current last one, on the
/// caller's connection so they commit together with the article row.
pub(super) async fn append_images(
    conn: &mut SqliteConnection,
    article_id: i64,
    urls: &[String],
) -> Result<(), StoreError> {
    if urls.is_empty() {
        return Ok(());
    }
    let (max,): (Option<i64>,) =
        sqlx::query_as("SELECT MAX(sort_order) FROM article_images WHERE article_id = ?")
            .bind(article_id)
            .fetch_one(&mut *conn)
            .await?;
    let start = max.map_or(0, |m| m + 1);

    for (url, sort_order) in urls.iter().zip(start..) {
        sqlx::query(
            "INSERT INTO article_images (article_id, image_url, image_caption, sort_order)
             VALUES (?, ?, NULL, ?)",
        )
        .bind(article_id)
        .bind(url)
        .bind(sort_order)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_helpers::{draft, memory_store};

    fn urls(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| format!("/uploads/{n}")).collect()
    }

    #[tokio::test]
    async fn images_start_at_zero_and_continue_after_max() {
        let store = memory_store().await;
        let id = store
            .create_article_with_images(&draft("Casa", "2024-01-01"), &urls(&["a.jpg", "b.jpg"]))
            .await
            .unwrap();
        store
            .update_article_with_images(id, &draft("Casa", "2024-01-01"), &urls(&["c.jpg"]))
            .await
            .unwrap();

        let rows: Vec<_> = store
            .images_for_article(id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| (i.image_url, i.sort_order))
            .collect();
        assert_eq!(
            rows,
            [
                ("/uploads/a.jpg".to_string(), 0),
                ("/uploads/b.jpg".to_string(), 1),
                ("/uploads/c.jpg".to_string(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn failed_image_insert_rolls_back_new_article() {
        let store = memory_store().await;
        sqlx::raw_sql(
            "CREATE TRIGGER reject_images BEFORE INSERT ON article_images
             BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let result = store
            .create_article_with_images(&draft("Casa", "2024-01-01"), &urls(&["a.jpg"]))
            .await;
        assert!(result.is_err());
        assert_eq!(store.count_articles().await.unwrap(), 0);
    }
}
