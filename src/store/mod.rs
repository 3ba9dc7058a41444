pub(crate) mod dry_run;
pub(crate) mod postgrest;

pub use dry_run::DryRunStore;
pub use postgrest::PostgrestStore;

use crate::error::SnapshotResult;
use crate::record::MarketRecord;
use async_trait::async_trait;

/// Write side of the pipeline.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert every record of `batch` into `table`, replacing any existing
    /// row whose `conflict_key` column matches.
    ///
    /// Fails with `Persistence` when the store rejects the batch.
    async fn upsert(
        &self,
        table: &str,
        conflict_key: &str,
        batch: &[MarketRecord],
    ) -> SnapshotResult<()>;
}
