//! This module is responsible for reading, writing and managing the SQLite database

mod migrations;

use crate::store::{Key, Store};
use crate::Result;
use anyhow::{bail, ensure, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::debug;

/// The schema version this build of the app expects.
const CURRENT_VERSION: i32 = 1;

/// The SQLite key-value store. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that there is a SQLite file at `path`
    /// - Creates a SQLite client
    /// - Updates the database schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure!(
            path.is_file(),
            "The SQLite database is missing at '{}'",
            path.display()
        );
        let pool = connect(path, false).await?;

        let version = schema_version(&pool).await?;
        if version > CURRENT_VERSION {
            bail!(
                "The database schema version {version} is newer than this program supports \
                ({CURRENT_VERSION}), please upgrade taxhelper"
            );
        }
        migrations::run(&pool, version, CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A SQLite database already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;

        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .context("Failed to create schema_version table")?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(&pool)
            .await
            .context("Failed to insert initial schema version")?;

        migrations::run(&pool, 0, CURRENT_VERSION).await?;
        debug!("Created SQLite database at {}", path.display());
        Ok(Self { pool })
    }
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open SQLite database at '{}'", path.display()))
}

async fn schema_version(pool: &SqlitePool) -> Result<i32> {
    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    Ok(row.0.unwrap_or_default())
}

#[async_trait::async_trait]
impl Store for Db {
    async fn get_raw(&self, key: Key) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key.to_string())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to read '{key}' from the database"))?;
        Ok(row.map(|(value,)| value))
    }

    async fn put_raw(&self, key: Key, value: String) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key.to_string())
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to write '{key}' to the database"))?;
        Ok(())
    }

    async fn remove(&self, key: Key) -> Result<()> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key.to_string())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to remove '{key}' from the database"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.sqlite");

        let db = Db::init(&path).await.unwrap();
        db.put_raw(Key::HkdGroup, r#""group2""#.to_string())
            .await
            .unwrap();
        db.put_raw(Key::HkdGroup, r#""group3""#.to_string())
            .await
            .unwrap();
        drop(db);

        let db = Db::load(&path).await.unwrap();
        assert_eq!(schema_version(&db.pool).await.unwrap(), CURRENT_VERSION);
        assert_eq!(
            db.get_raw(Key::HkdGroup).await.unwrap().as_deref(),
            Some(r#""group3""#)
        );
        db.remove(Key::HkdGroup).await.unwrap();
        assert!(db.get_raw(Key::HkdGroup).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_init_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.sqlite");
        std::fs::write(&path, b"").unwrap();
        assert!(Db::init(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_load_requires_file() {
        let dir = TempDir::new().unwrap();
        assert!(Db::load(dir.path().join("missing.sqlite")).await.is_err());
    }
}
