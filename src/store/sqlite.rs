// src/store/sqlite.rs

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use super::SnapshotBackend;
use crate::error::StoreError;

/// Stores each snapshot as a row of the `snapshots` table.
/// The body is the same JSON document the file backend writes.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Connects to `database_url`, creating the database file if needed, and
    /// applies the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Snapshot migrations applied.");
        Ok(Self { pool })
    }
}

#[async_trait]
impl SnapshotBackend for SqliteBackend {
    async fn read(&self, namespace: &str) -> Result<Option<String>, StoreError> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM snapshots WHERE namespace = ?1")
                .bind(namespace)
                .fetch_optional(&self.pool)
                .await?;
        Ok(body)
    }

    async fn write(&self, namespace: &str, body: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO snapshots (namespace, body, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(namespace) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(namespace)
        .bind(body)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write snapshot '{}': {:?}", namespace, e);
            StoreError::from(e)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_replaces_previous_snapshot() {
        let backend = SqliteBackend::connect("sqlite::memory:").await.unwrap();
        assert_eq!(backend.read("files").await.unwrap(), None);

        backend.write("files", r#"{"A": "1"}"#).await.unwrap();
        backend.write("files", r#"{"A": "2"}"#).await.unwrap();

        assert_eq!(
            backend.read("files").await.unwrap().as_deref(),
            Some(r#"{"A": "2"}"#)
        );
    }
}
