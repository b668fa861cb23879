use sqlx::PgPool;

use crate::feedback::repo_types::{Feedback, NewFeedback};
use crate::store::StoreError;

impl Feedback {
    pub async fn find_by_id(db: &PgPool, id: i32) -> Result<Option<Feedback>, StoreError> {
        let row = sqlx::query_as::<_, Feedback>(
            r#"
            SELECT id, title, content, username
            FROM feedback
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn list_by_user(db: &PgPool, username: &str) -> Result<Vec<Feedback>, StoreError> {
        let rows = sqlx::query_as::<_, Feedback>(
            r#"
            SELECT id, title, content, username
            FROM feedback
            WHERE username = $1
            ORDER BY id
            "#,
        )
        .bind(username)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(db: &PgPool, new: &NewFeedback) -> Result<Feedback, StoreError> {
        let row = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (title, content, username)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, username
            "#,
        )
        .bind(&new.title)
        .bind(&new.content)
        .bind(&new.username)
        .fetch_one(db)
        .await
        .map_err(StoreError::from_write)?;
        Ok(row)
    }

    /// The owner is part of the predicate, so a non-owner matches no row.
    pub async fn update_owned(
        db: &PgPool,
        id: i32,
        owner: &str,
        title: &str,
        content: &str,
    ) -> Result<Option<Feedback>, StoreError> {
        let row = sqlx::query_as::<_, Feedback>(
            r#"
            UPDATE feedback
               SET title = $3, content = $4
             WHERE id = $1 AND username = $2
            RETURNING id, title, content, username
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(title)
        .bind(content)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn delete_owned(db: &PgPool, id: i32, owner: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(owner)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
