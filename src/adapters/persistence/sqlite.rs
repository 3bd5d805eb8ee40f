//! SQLite Price Store - Durable Record Persistence
//!
//! Owns the single database handle for the process. The pool is capped
//! at one connection, so writes are serialized and each statement is
//! committed on its own (autocommit, no batching).

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::domain::record::PriceRecord;
use crate::ports::repository::PriceRepository;

const CREATE_PRICES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS prices (
        timestamp TEXT PRIMARY KEY,
        price_usd REAL
    )
";

const UPSERT_PRICE: &str = r"
    INSERT OR REPLACE INTO prices (timestamp, price_usd)
    VALUES (?, ?)
";

/// Price store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to create schema: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// SQLite-backed price record store.
pub struct PriceStore {
    pool: SqlitePool,
}

impl PriceStore {
    /// Open (creating if needed) the database file and ensure the schema.
    #[instrument(skip(path), fields(db = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Open {
                path: path.display().to_string(),
                source,
            })?;

        sqlx::query(CREATE_PRICES_TABLE)
            .execute(&pool)
            .await
            .map_err(StoreError::Schema)?;

        info!(path = %path.display(), "Price store opened");
        Ok(Self { pool })
    }

    /// Insert or replace one record.
    pub async fn insert_or_replace(&self, record: &PriceRecord) -> StoreResult<()> {
        debug!(
            timestamp = %record.timestamp,
            price_usd = record.price_usd,
            "Upserting price record"
        );

        sqlx::query(UPSERT_PRICE)
            .bind(&record.timestamp)
            .bind(record.price_usd)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// All records ordered by timestamp.
    pub async fn fetch_all(&self) -> StoreResult<Vec<PriceRecord>> {
        let rows = sqlx::query("SELECT timestamp, price_usd FROM prices ORDER BY timestamp")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_record).collect()
    }

    /// Newest record, if the table is not empty.
    pub async fn fetch_latest(&self) -> StoreResult<Option<PriceRecord>> {
        let row = sqlx::query(
            "SELECT timestamp, price_usd FROM prices ORDER BY timestamp DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    /// Row count.
    pub async fn row_count(&self) -> StoreResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM prices")
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(u64::try_from(n).unwrap_or_default())
    }

    /// Release the database handle. Further calls fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Price store closed");
    }
}

fn row_to_record(row: &SqliteRow) -> StoreResult<PriceRecord> {
    Ok(PriceRecord {
        timestamp: row.try_get("timestamp")?,
        price_usd: row.try_get("price_usd")?,
    })
}

#[async_trait]
impl PriceRepository for PriceStore {
    async fn upsert(&self, record: &PriceRecord) -> anyhow::Result<()> {
        Ok(self.insert_or_replace(record).await?)
    }

    async fn load_all(&self) -> anyhow::Result<Vec<PriceRecord>> {
        Ok(self.fetch_all().await?)
    }

    async fn latest(&self) -> anyhow::Result<Option<PriceRecord>> {
        Ok(self.fetch_latest().await?)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.row_count().await?)
    }

    async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
