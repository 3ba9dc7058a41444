//! Error taxonomy for a snapshot run.
//!
//! Binary plumbing (logging setup, `.env` loading) stays on `anyhow`; the
//! pipeline itself returns [`SnapshotError`] so the accumulator can tell an
//! exhausted source apart from an unreachable one.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The market-data source answered with a non-success status, or could
    /// not be reached at all.
    #[error("market data source unavailable (page {page}): {detail}")]
    SourceUnavailable { page: u32, detail: String },

    /// The page body could not be decoded as an array of records.
    /// Treated as end of data by the accumulator.
    #[error("malformed page {page}: {detail}")]
    MalformedPage { page: u32, detail: String },

    /// The store rejected an upsert.
    #[error("upsert of batch {batch} of {of} failed: {detail}")]
    Persistence {
        batch: usize,
        of: usize,
        detail: String,
    },

    /// Required settings are missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Longest slice of a remote error body echoed back in an error.
pub(crate) const MAX_ERROR_BODY: usize = 512;

/// Trimmed error body, cut to at most [`MAX_ERROR_BODY`] characters.
pub(crate) fn truncate_body(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

impl SnapshotError {
    /// Attach batch position to a persistence failure raised by a store.
    ///
    /// Stores only know about the slice they were handed; the upsert loop
    /// fills in where that slice sits in the run.
    pub(crate) fn at_batch(self, batch: usize, of: usize) -> Self {
        match self {
            SnapshotError::Persistence { detail, .. } => {
                SnapshotError::Persistence { batch, of, detail }
            }
            other => other,
        }
    }
}
