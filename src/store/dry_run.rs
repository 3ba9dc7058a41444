use super::SnapshotStore;
use crate::error::SnapshotResult;
use crate::record::MarketRecord;
use async_trait::async_trait;
use tracing::info;

/// Store that only logs what it would have written.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunStore;

#[async_trait]
impl SnapshotStore for DryRunStore {
    async fn upsert(
        &self,
        table: &str,
        conflict_key: &str,
        batch: &[MarketRecord],
    ) -> SnapshotResult<()> {
        let first = batch.first().and_then(|r| r.key(conflict_key));
        let last = batch.last().and_then(|r| r.key(conflict_key));
        info!(
            "Dry run: would upsert {} rows into {} on {} ({} .. {})",
            batch.len(),
            table,
            conflict_key,
            first.as_ref().map(|k| k.as_str()).unwrap_or("-"),
            last.as_ref().map(|k| k.as_str()).unwrap_or("-"),
        );
        Ok(())
    }
}
