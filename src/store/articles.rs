use super::images::append_images;
use super::{Store, StoreError, slug_conflict};
use crate::types::{Article, ArticleDraft};
use sqlx::SqliteConnection;
use tracing::info;

const ORDER_BY_DATE: &str = "ORDER BY datetime(published_at) DESC, id DESC";

impl Store {
    /// All articles, newest first.
    pub async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let sql = format!("SELECT * FROM articles {ORDER_BY_DATE}");
        Ok(sqlx::query_as::<_, Article>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    /// One page of articles, newest first.
    pub async fn list_articles_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Article>, StoreError> {
        let sql = format!("SELECT * FROM articles {ORDER_BY_DATE} LIMIT ? OFFSET ?");
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn count_articles(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn find_article(&self, id: i64) -> Result<Option<Article>, StoreError> {
        Ok(sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_article_by_slug(&self, slug: &str) -> Result<Option<Article>, StoreError> {
        Ok(sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Insert a new article and return its id.
    ///
    /// Fails with [`StoreError::DuplicateSlug`] when the slug is taken.
    pub async fn create_article(&self, draft: &ArticleDraft) -> Result<i64, StoreError> {
        self.create_article_with_images(draft, &[]).await
    }

    /// Insert a new article and its carousel images in one transaction.
    pub async fn create_article_with_images(
        &self,
        draft: &ArticleDraft,
        image_urls: &[String],
    ) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = insert_article(&mut tx, draft).await?;
        append_images(&mut tx, id, image_urls).await?;
        tx.commit().await?;

        info!(id, slug = %draft.slug, images = image_urls.len(), "article created");
        Ok(id)
    }

    /// Overwrite every column of article `id` with `draft`.
    pub async fn update_article(&self, id: i64, draft: &ArticleDraft) -> Result<(), StoreError> {
        self.update_article_with_images(id, draft, &[]).await
    }

    /// Overwrite article `id` and append carousel images in one transaction.
    pub async fn update_article_with_images(
        &self,
        id: i64,
        draft: &ArticleDraft,
        image_urls: &[String],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        overwrite_article(&mut tx, id, draft).await?;
        append_images(&mut tx, id, image_urls).await?;
        tx.commit().await?;

        info!(id, slug = %draft.slug, images = image_urls.len(), "article updated");
        Ok(())
    }

    /// Delete an article and, through the cascade, everything it owns.
    pub async fn delete_article(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::ArticleNotFound(id));
        }
        info!(id, "article deleted");
        Ok(())
    }
}

async fn insert_article(conn: &mut SqliteConnection, draft: &ArticleDraft) -> Result<i64, StoreError> {
    let result = sqlx::query(
        "INSERT INTO articles (
            slug, title, subtitle, category, author, author_role,
            published_at, reading_time, hero_image, hero_caption, excerpt, body_html,
            highlight_quote, highlight_focus, highlight_stat_label,
            highlight_stat_value, highlight_stat_helper
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&draft.slug)
    .bind(&draft.title)
    .bind(&draft.subtitle)
    .bind(&draft.category)
    .bind(&draft.author)
    .bind(&draft.author_role)
    .bind(&draft.published_at)
    .bind(i64::from(draft.reading_time))
    .bind(&draft.hero_image)
    .bind(&draft.hero_caption)
    .bind(&draft.excerpt)
    .bind(&draft.body_html)
    .bind(&draft.highlight_quote)
    .bind(&draft.highlight_focus)
    .bind(&draft.highlight_stat_label)
    .bind(&draft.highlight_stat_value)
    .bind(&draft.highlight_stat_helper)
    .execute(&mut *conn)
    .await
    .map_err(|e| slug_conflict(e, &draft.slug))?;
    Ok(result.last_insert_rowid())
}

async fn overwrite_article(
    conn: &mut SqliteConnection,
    id: i64,
    draft: &ArticleDraft,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        "UPDATE articles SET
            slug = ?, title = ?, subtitle = ?, category = ?, author = ?, author_role = ?,
            published_at = ?, reading_time = ?, hero_image = ?, hero_caption = ?,
            excerpt = ?, body_html = ?, highlight_quote = ?, highlight_focus = ?,
            highlight_stat_label = ?, highlight_stat_value = ?, highlight_stat_helper = ?
        WHERE id = ?",
    )
    .bind(&draft.slug)
    .bind(&draft.title)
    .bind(&draft.subtitle)
    .bind(&draft.category)
    .bind(&draft.author)
    .bind(&draft.author_role)
    .bind(&draft.published_at)
    .bind(i64::from(draft.reading_time))
    .bind(&draft.hero_image)
    .bind(&draft.hero_caption)
    .bind(&draft.excerpt)
    .bind(&draft.body_html)
    .bind(&draft.highlight_quote)
    .bind(&draft.highlight_focus)
    .bind(&draft.highlight_stat_label)
    .bind(&draft.highlight_stat_value)
    .bind(&draft.highlight_stat_helper)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|e| slug_conflict(e, &draft.slug))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::ArticleNotFound(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{draft, memory_store};

    #[tokio::test]
    async fn create_then_find_by_id_and_slug() {
        let store = memory_store().await;
        let id = store.create_article(&draft("Casa Ilha", "2024-05-01")).await.unwrap();

        let by_id = store.find_article(id).await.unwrap().unwrap();
        assert_eq!(by_id.title, "Casa Ilha");
        assert_eq!(by_id.reading_time, Some(3));

        let by_slug = store.find_article_by_slug("casa-ilha").await.unwrap().unwrap();
        assert_eq!(by_slug.id, id);
    }

    #[tokio::test]
    async fn missing_article_is_none() {
        let store = memory_store().await;
        assert!(store.find_article(42).await.unwrap().is_none());
        assert!(store.find_article_by_slug("nada").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let store = memory_store().await;
        store.create_article(&draft("Casa Ilha", "2024-05-01")).await.unwrap();
        let err = store
            .create_article(&draft("Casa Ilha", "2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSlug(ref s) if s == "casa-ilha"));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = memory_store().await;
        store.create_article(&draft("Antiga", "2023-01-10")).await.unwrap();
        store.create_article(&draft("Nova", "2024-09-01")).await.unwrap();
        store.create_article(&draft("Meio", "2024-02-15")).await.unwrap();

        let titles: Vec<_> = store
            .list_articles()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, ["Nova", "Meio", "Antiga"]);
    }

    #[tokio::test]
    async fn page_applies_limit_and_offset() {
        let store = memory_store().await;
        for (title, date) in [("A", "2024-01-01"), ("B", "2024-01-02"), ("C", "2024-01-03")] {
            store.create_article(&draft(title, date)).await.unwrap();
        }
        let page = store.list_articles_page(2, 1).await.unwrap();
        let titles: Vec<_> = page.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);
        assert_eq!(store.count_articles().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn update_overwrites_and_reports_missing() {
        let store = memory_store().await;
        let id = store.create_article(&draft("Casa Ilha", "2024-05-01")).await.unwrap();

        let mut changed = draft("Casa Ilha Revisitada", "2024-05-01");
        changed.category = "Residencial".to_string();
        store.update_article(id, &changed).await.unwrap();

        let article = store.find_article(id).await.unwrap().unwrap();
        assert_eq!(article.slug, "casa-ilha-revisitada");
        assert_eq!(article.category.as_deref(), Some("Residencial"));

        let err = store.update_article(999, &changed).await.unwrap_err();
        assert!(matches!(err, StoreError::ArticleNotFound(999)));
    }

    #[tokio::test]
    async fn update_into_existing_slug_is_rejected() {
        let store = memory_store().await;
        store.create_article(&draft("Primeira", "2024-05-01")).await.unwrap();
        let second = store.create_article(&draft("Segunda", "2024-05-02")).await.unwrap();
        let err = store
            .update_article(second, &draft("Primeira", "2024-05-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSlug(_)));
    }

    #[tokio::test]
    async fn delete_cascades_to_children() {
        let store = memory_store().await;
        let id = store
            .create_article_with_images(
                &draft("Casa Ilha", "2024-05-01"),
                &["/uploads/img.jpg".to_string()],
            )
            .await
            .unwrap();

        store.delete_article(id).await.unwrap();
        assert!(store.find_article(id).await.unwrap().is_none());
        assert!(store.images_for_article(id).await.unwrap().is_empty());

        let err = store.delete_article(id).await.unwrap_err();
        assert!(matches!(err, StoreError::ArticleNotFound(_)));
    }
}
