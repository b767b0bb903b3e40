use super::{Store, StoreError};
use crate::types::{ArticleSection, NewSection};

impl Store {
    pub async fn sections_for_article(
        &self,
        article_id: i64,
    ) -> Result<Vec<ArticleSection>, StoreError> {
        Ok(sqlx::query_as::<_, ArticleSection>(
            "SELECT * FROM article_sections WHERE article_id = ? ORDER BY sort_order ASC, id ASC",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn add_section(&self, article_id: i64, section: &NewSection) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO article_sections
                (article_id, heading, content, media_url, media_caption, sort_order, layout_type)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(article_id)
        .bind(&section.heading)
        .bind(&section.content)
        .bind(&section.media_url)
        .bind(&section.media_caption)
        .bind(section.sort_order)
        .bind(&section.layout_type)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }
}
