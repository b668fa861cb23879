use sqlx::PgPool;

use crate::store::StoreError;
use crate::users::repo_types::User;

impl User {
    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT username, password_hash, email, first_name, last_name
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a registered user. A taken username comes back as `StoreError::Conflict`.
    pub async fn insert(db: &PgPool, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, email, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(db)
        .await
        .map_err(StoreError::from_write)?;
        Ok(())
    }

    /// Feedback rows go with the user through `ON DELETE CASCADE`.
    pub async fn delete(db: &PgPool, username: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
