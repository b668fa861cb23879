use anyhow::Context;
use axum::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::{PgSessionStore, Store, StoreError};
use crate::config::AppConfig;
use crate::feedback::repo_types::{Feedback, NewFeedback};
use crate::users::repo_types::User;

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn sessions(&self) -> PgSessionStore {
        PgSessionStore::new(self.db.clone())
    }

    /// Applies the schema in `migrations/`.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        User::find_by_username(&self.db, username).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        User::insert(&self.db, user).await
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        User::delete(&self.db, username).await
    }

    async fn find_feedback(&self, id: i32) -> Result<Option<Feedback>, StoreError> {
        Feedback::find_by_id(&self.db, id).await
    }

    async fn list_feedback(&self, username: &str) -> Result<Vec<Feedback>, StoreError> {
        Feedback::list_by_user(&self.db, username).await
    }

    async fn insert_feedback(&self, new: &NewFeedback) -> Result<Feedback, StoreError> {
        Feedback::create(&self.db, new).await
    }

    async fn update_feedback(
        &self,
        id: i32,
        owner: &str,
        title: &str,
        content: &str,
    ) -> Result<Option<Feedback>, StoreError> {
        Feedback::update_owned(&self.db, id, owner, title, content).await
    }

    async fn delete_feedback(&self, id: i32, owner: &str) -> Result<bool, StoreError> {
        Feedback::delete_owned(&self.db, id, owner).await
    }
}
