//! The persistence interface (§1, §6) plus a concrete `SQLite`-backed
//! implementation so the workspace is runnable without an external
//! key/value service.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;
use thiserror::Error;
use vicinity_models::Response;

/// Default path for the recommendation cache database.
pub const DEFAULT_DB_PATH: &str = "data/recommendation_cache.db";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Advisory counters and bounds over the whole cache table.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub count: u64,
    pub earliest_created_at: Option<DateTime<Utc>>,
    pub latest_created_at: Option<DateTime<Utc>>,
}

/// A key/value store with TTL, keyed by string, valued by a serialized
/// [`Response`]. `get` must respect expiry transparently — an expired
/// entry behaves exactly like a miss.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CacheError`] on a persistence failure (not on a miss,
    /// which is `Ok(None)`).
    async fn get(&self, key: &str) -> Result<Option<Response>, CacheError>;

    /// Upserts `response` under `key` with the given time-to-live. Resets
    /// the advisory hit counter on overwrite.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] on a persistence failure.
    async fn upsert(&self, key: &str, response: &Response, ttl: Duration) -> Result<(), CacheError>;

    /// Deletes all entries whose TTL has elapsed. Returns the number of
    /// rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] on a persistence failure.
    async fn delete_expired(&self) -> Result<u64, CacheError>;

    /// # Errors
    ///
    /// Returns [`CacheError`] on a persistence failure.
    async fn stats(&self) -> Result<CacheStats, CacheError>;
}

/// `SQLite`-backed [`CacheStore`], following the same open/schema/query
/// pattern used elsewhere in this workspace for small single-table stores.
pub struct SqliteCacheStore {
    db: Box<dyn Database>,
}

impl SqliteCacheStore {
    /// Opens (or creates) the cache database and ensures its schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the database cannot be opened or the
    /// schema cannot be created.
    pub async fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = init_sqlite_rusqlite(Some(path)).map_err(|e| CacheError::Database(e.to_string()))?;
        ensure_schema(db.as_ref()).await?;

        Ok(Self { db })
    }

    /// Opens the cache database at [`DEFAULT_DB_PATH`].
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] under the same conditions as [`Self::open`].
    pub async fn open_default() -> Result<Self, CacheError> {
        Self::open(Path::new(DEFAULT_DB_PATH)).await
    }
}

async fn ensure_schema(db: &dyn Database) -> Result<(), CacheError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS recommendation_cache (
            key               TEXT PRIMARY KEY,
            value             TEXT NOT NULL,
            created_at        TEXT NOT NULL,
            expires_at        TEXT NOT NULL,
            hit_count         INTEGER NOT NULL DEFAULT 0,
            last_accessed_at  TEXT
        )",
    )
    .await
    .map_err(|e| CacheError::Database(e.to_string()))?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_recommendation_cache_expires ON recommendation_cache (expires_at)")
        .await
        .map_err(|e| CacheError::Database(e.to_string()))?;

    Ok(())
}

#[async_trait::async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Response>, CacheError> {
        let now = Utc::now().to_rfc3339();

        let rows = self
            .db
            .query_raw_params(
                "SELECT value FROM recommendation_cache WHERE key = $1 AND expires_at > $2",
                &[DatabaseValue::String(key.to_string()), DatabaseValue::String(now.clone())],
            )
            .await
            .map_err(|e| CacheError::Database(e.to_string()))?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let value_json: String = row.to_value("value").unwrap_or_default();
        let response: Response = serde_json::from_str(&value_json)?;

        self.db
            .exec_raw_params(
                "UPDATE recommendation_cache SET hit_count = hit_count + 1, last_accessed_at = $2 WHERE key = $1",
                &[DatabaseValue::String(key.to_string()), DatabaseValue::String(now)],
            )
            .await
            .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(Some(response))
    }

    async fn upsert(&self, key: &str, response: &Response, ttl: Duration) -> Result<(), CacheError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(24));
        let value_json = serde_json::to_string(response)?;

        self.db
            .exec_raw_params(
                "INSERT INTO recommendation_cache (key, value, created_at, expires_at, hit_count, last_accessed_at)
                 VALUES ($1, $2, $3, $4, 0, NULL)
                 ON CONFLICT (key) DO UPDATE SET
                   value = excluded.value,
                   created_at = excluded.created_at,
                   expires_at = excluded.expires_at,
                   hit_count = 0,
                   last_accessed_at = NULL",
                &[
                    DatabaseValue::String(key.to_string()),
                    DatabaseValue::String(value_json),
                    DatabaseValue::String(now.to_rfc3339()),
                    DatabaseValue::String(expires_at.to_rfc3339()),
                ],
            )
            .await
            .map_err(|e| CacheError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, CacheError> {
        let now = Utc::now().to_rfc3339();
        let deleted = self
            .db
            .exec_raw_params(
                "DELETE FROM recommendation_cache WHERE expires_at <= $1",
                &[DatabaseValue::String(now)],
            )
            .await
            .map_err(|e| CacheError::Database(e.to_string()))?;

        #[allow(clippy::cast_sign_loss)]
        Ok(deleted as u64)
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT COUNT(*) as cnt, MIN(created_at) as earliest, MAX(created_at) as latest
                 FROM recommendation_cache",
                &[],
            )
            .await
            .map_err(|e| CacheError::Database(e.to_string()))?;

        let Some(row) = rows.first() else {
            return Ok(CacheStats {
                count: 0,
                earliest_created_at: None,
                latest_created_at: None,
            });
        };

        let count: i64 = row.to_value("cnt").unwrap_or(0);
        let earliest: Option<String> = row.to_value("earliest").unwrap_or(None);
        let latest: Option<String> = row.to_value("latest").unwrap_or(None);

        #[allow(clippy::cast_sign_loss)]
        Ok(CacheStats {
            count: count as u64,
            earliest_created_at: earliest.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()).map(|dt| dt.with_timezone(&Utc)),
            latest_created_at: latest.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()).map(|dt| dt.with_timezone(&Utc)),
        })
    }
}
