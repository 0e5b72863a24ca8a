mod memory;

pub use memory::MemoryStorage;

use crate::error::StorageError;
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::{SqlitePool, SqlitePoolOptions}, Row, Sqlite};

/// Durable string key-value layer underneath the tally store. Values are the
/// raw serialized records, so every backend persists the same JSON shape.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Writes `value` only if the current raw value equals `expected`
    /// (`None` meaning absent). Returns whether the write happened.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StorageError>;
}

pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub async fn connect(db_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        // Create database if it doesn't exist
        if !db_url.contains(":memory:") && !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating tally database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        // Connect to the database
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;

        // Initialize schema
        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tally_records (
                poll_id TEXT PRIMARY KEY,
                record TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT record FROM tally_records WHERE poll_id = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get::<String, _>("record")))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO tally_records (poll_id, record, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(poll_id)
            DO UPDATE SET record = excluded.record, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StorageError> {
        let now = Utc::now().to_rfc3339();
        let result = match expected {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO tally_records (poll_id, record, updated_at)
                    VALUES (?, ?, ?)
                    ON CONFLICT(poll_id) DO NOTHING
                    "#,
                )
                .bind(key)
                .bind(value)
                .bind(&now)
                .execute(&self.pool)
                .await?
            }
            Some(expected) => {
                sqlx::query(
                    r#"
                    UPDATE tally_records
                    SET record = ?, updated_at = ?
                    WHERE poll_id = ? AND record = ?
                    "#,
                )
                .bind(value)
                .bind(&now)
                .bind(key)
                .bind(expected)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> SqliteStorage {
        SqliteStorage::connect("sqlite::memory:", 1).await.unwrap()
    }

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let db = memory_db().await;
        assert_eq!(db.get_item("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_item_overwrites() {
        let db = memory_db().await;
        db.set_item("p1", r#"{"A":1,"totalPolls":1}"#).await.unwrap();
        db.set_item("p1", r#"{"A":2,"totalPolls":2}"#).await.unwrap();
        assert_eq!(
            db.get_item("p1").await.unwrap().as_deref(),
            Some(r#"{"A":2,"totalPolls":2}"#)
        );
    }

    #[tokio::test]
    async fn test_compare_and_set_requires_matching_value() {
        let db = memory_db().await;

        assert!(db.compare_and_set("p1", None, "first").await.unwrap());
        assert!(!db.compare_and_set("p1", None, "again").await.unwrap());
        assert!(!db.compare_and_set("p1", Some("stale"), "second").await.unwrap());
        assert!(db.compare_and_set("p1", Some("first"), "second").await.unwrap());

        assert_eq!(db.get_item("p1").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("tally.db").display());

        let db = SqliteStorage::connect(&url, 2).await.unwrap();
        db.set_item("p1", "{}").await.unwrap();
        drop(db);

        let reopened = SqliteStorage::connect(&url, 2).await.unwrap();
        assert_eq!(reopened.get_item("p1").await.unwrap().as_deref(), Some("{}"));
    }
}
