use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use common::{Filter, Result, TradeRecord, TradeStore};

/// In-process trade store.
///
/// Holds records in insertion order; queries return them sorted by
/// `(trade_date, source_row)` the same way the SQLite store does.
#[derive(Default)]
pub struct MemoryTradeStore {
    records: RwLock<Vec<TradeRecord>>,
}

impl MemoryTradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `records`.
    pub fn with_records(records: Vec<TradeRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl TradeStore for MemoryTradeStore {
    async fn bulk_insert(&self, records: &[TradeRecord]) -> Result<u64> {
        self.records.write().await.extend_from_slice(records);
        Ok(records.len() as u64)
    }

    async fn query_filtered(&self, filter: &Filter) -> Result<Vec<TradeRecord>> {
        let mut rows: Vec<TradeRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.trade_date, r.source_row));
        Ok(rows)
    }

    async fn rebuild(&self) -> Result<()> {
        let mut records = self.records.write().await;
        info!(dropped = records.len(), "Rebuilding in-memory trade store");
        records.clear();
        Ok(())
    }

    async fn record_count(&self) -> Result<u64> {
        Ok(self.records.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(day: u32, symbol: &str, row: i64) -> TradeRecord {
        TradeRecord {
            source_row: row,
            ..TradeRecord::new(NaiveDate::from_ymd_opt(2024, 5, day).unwrap(), symbol)
        }
    }

    #[tokio::test]
    async fn query_sorts_and_filters() {
        let store = MemoryTradeStore::new();
        store
            .bulk_insert(&[rec(3, "A", 1), rec(1, "B", 2), rec(1, "A", 3)])
            .await
            .unwrap();

        let all = store.query_filtered(&Filter::default()).await.unwrap();
        let rows: Vec<i64> = all.iter().map(|r| r.source_row).collect();
        assert_eq!(rows, vec![2, 3, 1]);

        let only_a = store.query_filtered(&Filter::for_symbol("a")).await.unwrap();
        assert_eq!(only_a.len(), 2);
    }

    #[tokio::test]
    async fn rebuild_clears_records() {
        let store = MemoryTradeStore::with_records(vec![rec(1, "A", 1)]);
        assert_eq!(store.record_count().await.unwrap(), 1);
        store.rebuild().await.unwrap();
        assert_eq!(store.record_count().await.unwrap(), 0);
    }
}
