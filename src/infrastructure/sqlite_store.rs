use std::fs::{self, OpenOptions};
use std::path::Path;
use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};

use crate::domain::store::SessionStore;

/// Key/value records in a local SQLite file, the client's durable storage.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteSessionStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        // Each connection to `sqlite::memory:` opens its own database, so pin
        // in-memory stores to a single connection that never idles out.
        let options = if database_url.starts_with("sqlite::memory:") {
            SqlitePoolOptions::new().max_connections(1).idle_timeout(None::<Duration>).max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = options.connect(database_url).await?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }
}

/// Creates the database file (and its directory) behind a `sqlite://` URL so
/// the first run does not fail to open it. Memory URLs are left alone.
pub fn prepare_sqlite_file(database_url: &str) -> Result<()> {
    let Some(raw) = database_url.strip_prefix("sqlite://") else { return Ok(()) };
    let raw = raw.split('?').next().unwrap_or(raw);
    // `/C:/data.db` on Windows
    let raw = match raw.as_bytes() {
        [b'/', _, b':', ..] if cfg!(windows) => &raw[1..],
        _ => raw,
    };
    let path = Path::new(raw);
    if path.exists() { return Ok(()); }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    OpenOptions::new().create(true).append(true).open(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(())
}
