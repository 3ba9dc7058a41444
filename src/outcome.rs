//! Result of one invocation, as reported to whatever triggered it.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunOutcome {
    Success {
        /// Deduplicated records written.
        records: usize,
        batches: usize,
        /// Keys seen more than once before deduplication.
        duplicates: usize,
        finished_at: DateTime<Utc>,
        elapsed_ms: u64,
    },
    Failure {
        error: String,
        finished_at: DateTime<Utc>,
        elapsed_ms: u64,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success { .. })
    }

    /// Process exit code for the binary.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// One-line JSON rendering.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
