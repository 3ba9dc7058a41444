pub(crate) mod coingecko;

pub use coingecko::CoinGeckoSource;

use crate::error::SnapshotResult;
use crate::record::Page;
use async_trait::async_trait;

/// Read side of the pipeline: one page of market records per call.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch page `page` (1-based) holding at most `per_page` records.
    ///
    /// Fails with `SourceUnavailable` when the source cannot serve the page
    /// and with `MalformedPage` when the body is not an array of records.
    async fn fetch_page(&self, page: u32, per_page: usize) -> SnapshotResult<Page>;
}
