use crate::error::{SnapshotError, SnapshotResult};
use crate::record::MarketRecord;
use crate::source::MarketSource;
use tracing::{info, warn};

/// Why the page loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Running total reached the target.
    TargetReached,
    /// The source returned an empty page.
    Exhausted { page: u32 },
    /// The source returned something that was not a page.
    Malformed { page: u32 },
}

/// Fetch pages 1, 2, 3... until `target` records are collected or the source
/// runs dry, then trim to exactly `target`.
///
/// A short result is not an error: an exhausted source simply yields fewer
/// records. Only `SourceUnavailable` aborts the loop.
pub async fn accumulate(
    source: &dyn MarketSource,
    per_page: usize,
    target: usize,
) -> SnapshotResult<(Vec<MarketRecord>, StopReason)> {
    let (mut records, reason) = fetch_pages(source, per_page, target).await?;
    trim(&mut records, target);
    Ok((records, reason))
}

/// The page loop on its own. The last page is kept whole, so the result can
/// overshoot `target` by up to one page.
pub async fn fetch_pages(
    source: &dyn MarketSource,
    per_page: usize,
    target: usize,
) -> SnapshotResult<(Vec<MarketRecord>, StopReason)> {
    // Grows with what the source returns; `target` may be far larger.
    let mut records: Vec<MarketRecord> = Vec::new();
    let mut page: u32 = 1;

    let reason = loop {
        if records.len() >= target {
            break StopReason::TargetReached;
        }

        let batch = match source.fetch_page(page, per_page).await {
            Ok(batch) => batch,
            Err(SnapshotError::MalformedPage { page, detail }) => {
                warn!("Page {} is not a valid page, stopping: {}", page, detail);
                break StopReason::Malformed { page };
            }
            Err(e) => return Err(e),
        };

        if batch.is_empty() {
            info!("Page {} is empty, source exhausted", page);
            break StopReason::Exhausted { page };
        }

        records.extend(batch);
        info!("Fetched page {} (total {} records)", page, records.len());
        page += 1;
    };

    Ok((records, reason))
}

/// Cut the accumulated records down to `target`.
pub fn trim(records: &mut Vec<MarketRecord>, target: usize) {
    records.truncate(target);
}
