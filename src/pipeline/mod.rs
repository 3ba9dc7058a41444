//! The snapshot pipeline: fetch, trim, dedup, batch, upsert.
//!
//! Everything runs sequentially on the caller's task. Termination of the page
//! loop depends on seeing an empty page and the store relies on batches
//! arriving in order, so nothing here is parallelized.

pub mod accumulate;
pub mod batch;
pub mod dedup;
pub mod upsert;

use crate::config::SnapshotConfig;
use crate::error::SnapshotResult;
use crate::outcome::RunOutcome;
use crate::source::MarketSource;
use crate::store::SnapshotStore;
use accumulate::{fetch_pages, trim, StopReason};
use chrono::Utc;
use dedup::{deduplicate, find_duplicates};
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use upsert::upsert_batches;

/// Where a run currently is. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Fetching,
    Trimming,
    Deduplicating,
    Upserting { batch: usize, of: usize },
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::Fetching => write!(f, "fetching"),
            RunPhase::Trimming => write!(f, "trimming"),
            RunPhase::Deduplicating => write!(f, "deduplicating"),
            RunPhase::Upserting { batch, of } => write!(f, "upserting batch {batch} of {of}"),
            RunPhase::Done => write!(f, "done"),
            RunPhase::Failed => write!(f, "failed"),
        }
    }
}

/// Counts gathered by a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub batches: usize,
    pub duplicates: usize,
    pub stop: StopReason,
}

fn enter(phase: RunPhase) {
    debug!("phase -> {}", phase);
}

/// Run the pipeline once, propagating the first error.
pub async fn run_pipeline(
    config: &SnapshotConfig,
    source: &dyn MarketSource,
    store: &dyn SnapshotStore,
) -> SnapshotResult<RunSummary> {
    let key = config.conflict_key.as_str();

    enter(RunPhase::Fetching);
    let (mut fetched, stop) = fetch_pages(source, config.page_size, config.target_count).await?;

    enter(RunPhase::Trimming);
    trim(&mut fetched, config.target_count);
    if fetched.len() < config.target_count {
        info!(
            "Source yielded {} of {} target records ({:?})",
            fetched.len(),
            config.target_count,
            stop
        );
    }

    enter(RunPhase::Deduplicating);
    let duplicates = find_duplicates(&fetched, key);
    if !duplicates.is_empty() {
        let shown: Vec<&str> = duplicates.iter().map(|k| k.as_str()).collect();
        warn!("Duplicate {} values: {:?}", key, shown);
    }
    let deduped = deduplicate(fetched, key);
    if deduped.keyless > 0 {
        warn!("Dropped {} records without a {} value", deduped.keyless, key);
    }
    info!("Snapshot has {} unique records", deduped.records.len());

    let batches = upsert_batches(
        store,
        &config.table,
        key,
        &deduped.records,
        config.batch_size,
    )
    .await?;

    Ok(RunSummary {
        records: deduped.records.len(),
        batches,
        duplicates: duplicates.len(),
        stop,
    })
}

/// Handler entry point: run once and report the outcome.
pub async fn run_snapshot(
    config: &SnapshotConfig,
    source: &dyn MarketSource,
    store: &dyn SnapshotStore,
) -> RunOutcome {
    let start = Instant::now();
    enter(RunPhase::Idle);

    let result = run_pipeline(config, source, store).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let finished_at = Utc::now();

    match result {
        Ok(summary) => {
            enter(RunPhase::Done);
            info!(
                "Snapshot complete: {} records in {} batches ({} ms)",
                summary.records, summary.batches, elapsed_ms
            );
            RunOutcome::Success {
                records: summary.records,
                batches: summary.batches,
                duplicates: summary.duplicates,
                finished_at,
                elapsed_ms,
            }
        }
        Err(e) => {
            enter(RunPhase::Failed);
            error!("Snapshot failed: {}", e);
            RunOutcome::Failure {
                error: e.to_string(),
                finished_at,
                elapsed_ms,
            }
        }
    }
}
