//! Persistence seam.
//!
//! Handlers talk to a [`Store`] trait object held in [`AppState`](crate::state::AppState).
//! Production uses [`PgStore`]; handler tests swap in an in-memory store.
//! Sessions share the same pool through [`PgSessionStore`].

use axum::async_trait;
use thiserror::Error;

use crate::feedback::repo_types::{Feedback, NewFeedback};
use crate::users::repo_types::User;

#[cfg(test)]
pub mod memory;
mod postgres;
mod sessions;

pub use postgres::PgStore;
pub use sessions::PgSessionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("record already exists")]
    Conflict,
    /// A foreign key named a user that no longer exists.
    #[error("referenced user does not exist")]
    UnknownUser,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps unique and foreign-key violations onto their own variants.
    pub fn from_write(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::UnknownUser,
            _ => StoreError::Database(e),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;
    /// Fails with [`StoreError::Conflict`] when the username is taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    /// Deletes the user and, by cascade, their feedback. Returns false if no row matched.
    async fn delete_user(&self, username: &str) -> Result<bool, StoreError>;

    async fn find_feedback(&self, id: i32) -> Result<Option<Feedback>, StoreError>;
    async fn list_feedback(&self, username: &str) -> Result<Vec<Feedback>, StoreError>;
    /// Fails with [`StoreError::UnknownUser`] when the owner has been deleted.
    async fn insert_feedback(&self, new: &NewFeedback) -> Result<Feedback, StoreError>;
    /// Updates only when `owner` owns the row; `None` otherwise.
    async fn update_feedback(
        &self,
        id: i32,
        owner: &str,
        title: &str,
        content: &str,
    ) -> Result<Option<Feedback>, StoreError>;
    /// Deletes only when `owner` owns the row.
    async fn delete_feedback(&self, id: i32, owner: &str) -> Result<bool, StoreError>;
}
