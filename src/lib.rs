mod app;
mod args;
mod config;
mod error;
mod outcome;
pub mod pipeline;
mod record;
pub mod source;
pub mod store;
mod utils;

pub use app::Application;
pub use args::SnapshotArgs;
pub use config::{SnapshotConfig, SnapshotConfigBuilder, StoreCredentials};
pub use error::{SnapshotError, SnapshotResult};
pub use outcome::RunOutcome;
pub use pipeline::{run_pipeline, run_snapshot, RunPhase, RunSummary};
pub use record::{MarketRecord, Page, RecordKey};
pub use utils::logging::init_logging;
