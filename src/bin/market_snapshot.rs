//! Snapshot job binary: run the pipeline once and exit.
//!
//! Configuration comes from flags or the environment (a `.env` file is loaded
//! if present). The outcome is printed to stdout as one JSON line; logs go to
//! stderr.
//!
//! Exit codes: `0` success, `1` run failed, `2` configuration error.

use clap::Parser;
use market_snapshot::{init_logging, Application, SnapshotArgs};
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    init_logging();

    let args = SnapshotArgs::parse();

    let app = match Application::init(args) {
        Ok(app) => app,
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::from(2));
        }
    };
    app.config().log_summary();

    let outcome = app.run().await;
    println!("{}", outcome.to_json_line()?);

    Ok(ExitCode::from(outcome.exit_code()))
}
