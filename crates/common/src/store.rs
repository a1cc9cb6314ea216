use async_trait::async_trait;

use crate::{Filter, Result, TradeRecord};

/// Abstraction over the relational store of canonical trade records.
///
/// `SqliteTradeStore` implements this for deployments.
/// `MemoryTradeStore` implements this for tests and one-off analysis.
///
/// Every analytics, ingestion and valuation entry point receives the store
/// as an explicit argument; nothing holds a global connection.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Append records. Duplicates are not detected. Returns the inserted count.
    async fn bulk_insert(&self, records: &[TradeRecord]) -> Result<u64>;

    /// All records matching `filter`, ordered by `(trade_date, source_row)`.
    async fn query_filtered(&self, filter: &Filter) -> Result<Vec<TradeRecord>>;

    /// Drop and recreate the schema. Must not interleave with reads or inserts.
    async fn rebuild(&self) -> Result<()>;

    /// Total number of stored records.
    async fn record_count(&self) -> Result<u64>;
}
