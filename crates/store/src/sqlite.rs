use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use common::{Error, Filter, Result, TradeRecord, TradeStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Schema replayed by `rebuild`. Same file the migrator applies at connect time.
const SCHEMA_SQL: &str = include_str!("../../../migrations/0001_create_trades.sql");

/// Trade store backed by a SQLite database through a sqlx pool.
///
/// Reads and inserts hold the shared side of `gate`; `rebuild` holds the
/// exclusive side for its whole duration, so a rebuild never interleaves with
/// live queries and at most one rebuild runs at a time.
pub struct SqliteTradeStore {
    pool: SqlitePool,
    gate: RwLock<()>,
}

impl SqliteTradeStore {
    /// Connect to `database_url` (e.g. `sqlite://data/trades.db`), creating the
    /// file and its parent directory if needed, and apply migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let filename = options.clone().get_filename();
        if let Some(parent) = filename.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database. The pool is pinned to one connection that
    /// never expires, otherwise the database would vanish with it.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("../../migrations").run(&pool).await?;
        info!("Trade store ready");
        Ok(Self {
            pool,
            gate: RwLock::new(()),
        })
    }

}

#[derive(sqlx::FromRow)]
struct TradeRow {
    trade_date: String,
    symbol: String,
    sector: Option<String>,
    volume: Option<i64>,
    value: Option<f64>,
    price: Option<f64>,
    vwap: Option<f64>,
    source_row: i64,
    raw_json: String,
}

impl TryFrom<TradeRow> for TradeRecord {
    type Error = Error;

    fn try_from(row: TradeRow) -> Result<Self> {
        let trade_date = NaiveDate::parse_from_str(&row.trade_date, DATE_FORMAT).map_err(|e| {
            Error::Other(format!("stored trade_date '{}' is not ISO: {e}", row.trade_date))
        })?;
        Ok(TradeRecord {
            trade_date,
            symbol: row.symbol,
            sector: row.sector,
            volume: row.volume,
            value: row.value,
            price: row.price,
            vwap: row.vwap,
            source_row: row.source_row,
            raw_json: row.raw_json,
        })
    }
}

#[async_trait]
impl TradeStore for SqliteTradeStore {
    async fn bulk_insert(&self, records: &[TradeRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }
        let _shared = self.gate.read().await;

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;
        for record in records {
            let result = sqlx::query(
                r#"
                INSERT INTO trades (trade_date, symbol, sector, volume, value, price, vwap, source_row, raw_json)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(record.trade_date.format(DATE_FORMAT).to_string())
            .bind(&record.symbol)
            .bind(&record.sector)
            .bind(record.volume)
            .bind(record.value)
            .bind(record.price)
            .bind(record.vwap)
            .bind(record.source_row)
            .bind(&record.raw_json)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;

        debug!(inserted, "Inserted trade batch");
        Ok(inserted)
    }

    async fn query_filtered(&self, filter: &Filter) -> Result<Vec<TradeRecord>> {
        let _shared = self.gate.read().await;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT trade_date, symbol, sector, volume, value, price, vwap, source_row, raw_json \
             FROM trades WHERE 1=1",
        );
        if let Some(start) = filter.start_date {
            qb.push(" AND trade_date >= ")
                .push_bind(start.format(DATE_FORMAT).to_string());
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND trade_date <= ")
                .push_bind(end.format(DATE_FORMAT).to_string());
        }
        if let Some(symbol) = &filter.symbol {
            qb.push(" AND symbol = ").push_bind(symbol.clone());
        }
        if let Some(sector) = &filter.sector {
            qb.push(" AND sector = ").push_bind(sector.clone());
        }
        qb.push(" ORDER BY trade_date ASC, source_row ASC, id ASC");

        let rows: Vec<TradeRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(TradeRecord::try_from).collect()
    }

    async fn rebuild(&self) -> Result<()> {
        let _exclusive = self.gate.write().await;
        warn!("Rebuilding trade store, all records will be dropped");

        let mut tx = self.pool.begin().await?;
        (&mut *tx).execute("DROP TABLE IF EXISTS trades").await?;
        (&mut *tx).execute(SCHEMA_SQL).await?;
        tx.commit().await?;

        info!("Trade store rebuilt");
        Ok(())
    }

    async fn record_count(&self) -> Result<u64> {
        let _shared = self.gate.read().await;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trades")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
