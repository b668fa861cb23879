//! `tower-sessions` records kept in the application's Postgres pool.
//!
//! A record is stored as JSON next to its expiry as a unix timestamp.
//! Expired rows are never loaded and are removed by [`PgSessionStore::delete_expired`].

use std::time::Duration;

use axum::async_trait;
use sqlx::PgPool;
use tower_sessions::{
    session::{Id, Record},
    session_store::{self, SessionStore},
};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

fn backend(e: sqlx::Error) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}

fn encode(record: &Record) -> Result<String, session_store::Error> {
    serde_json::to_string(record).map_err(|e| session_store::Error::Encode(e.to_string()))
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Returns how many expired sessions were removed.
    pub async fn delete_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE expires_at <= extract(epoch FROM now())::bigint",
        )
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }

    /// Runs [`Self::delete_expired`] every `period`, forever.
    pub async fn delete_expired_every(self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match self.delete_expired().await {
                Ok(removed) => debug!(removed, "expired sessions deleted"),
                Err(e) => warn!(error = %e, "expired session cleanup failed"),
            }
        }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    /// Inserts under a fresh id, drawing again on collision.
    async fn create(&self, record: &mut Record) -> Result<(), session_store::Error> {
        loop {
            let inserted = sqlx::query(
                r#"
                INSERT INTO sessions (id, record, expires_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(record.id.to_string())
            .bind(encode(record)?)
            .bind(record.expiry_date.unix_timestamp())
            .execute(&self.db)
            .await
            .map_err(backend)?;
            if inserted.rows_affected() > 0 {
                return Ok(());
            }
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> Result<(), session_store::Error> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, record, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
               SET record = EXCLUDED.record, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(record.id.to_string())
        .bind(encode(record)?)
        .bind(record.expiry_date.unix_timestamp())
        .execute(&self.db)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn load(&self, id: &Id) -> Result<Option<Record>, session_store::Error> {
        let stored = sqlx::query_scalar::<_, String>(
            r#"
            SELECT record
            FROM sessions
            WHERE id = $1 AND expires_at > extract(epoch FROM now())::bigint
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.db)
        .await
        .map_err(backend)?;

        stored
            .map(|json| {
                serde_json::from_str(&json)
                    .map_err(|e| session_store::Error::Decode(e.to_string()))
            })
            .transpose()
    }

    async fn delete(&self, id: &Id) -> Result<(), session_store::Error> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.db)
            .await
            .map_err(backend)?;
        Ok(())
    }
}
