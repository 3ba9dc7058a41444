use crate::args::SnapshotArgs;
use crate::config::SnapshotConfig;
use crate::error::{SnapshotError, SnapshotResult};
use crate::outcome::RunOutcome;
use crate::pipeline::run_snapshot;
use crate::source::{CoinGeckoSource, MarketSource};
use crate::store::{DryRunStore, PostgrestStore, SnapshotStore};
use reqwest::Client;
use std::time::Duration;

/// A configured snapshot job with its collaborators wired up.
pub struct Application {
    config: SnapshotConfig,
    source: Box<dyn MarketSource>,
    store: Box<dyn SnapshotStore>,
}

impl Application {
    /// Validate arguments and build the HTTP collaborators.
    ///
    /// Fails with `Configuration` before any network traffic.
    pub fn init(args: SnapshotArgs) -> SnapshotResult<Application> {
        let config = SnapshotConfig::from_args(args)?;
        let client = build_http_client(config.http_timeout)?;

        let source = CoinGeckoSource::new(
            client.clone(),
            config.source_url.clone(),
            config.vs_currency.clone(),
        )
        .with_api_key(config.coingecko_api_key.clone());

        let store = build_store(&config, client)?;

        Ok(Self::with_parts(config, Box::new(source), store))
    }

    /// Assemble from explicit parts (used by tests with fake collaborators).
    pub fn with_parts(
        config: SnapshotConfig,
        source: Box<dyn MarketSource>,
        store: Box<dyn SnapshotStore>,
    ) -> Application {
        Self {
            config,
            source,
            store,
        }
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub async fn run(&self) -> RunOutcome {
        run_snapshot(&self.config, self.source.as_ref(), self.store.as_ref()).await
    }
}

/// One client for both collaborators; `None` leaves requests without a timeout.
fn build_http_client(timeout: Option<Duration>) -> SnapshotResult<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| SnapshotError::Configuration(format!("HTTP client: {e}")))
}

fn build_store(config: &SnapshotConfig, client: Client) -> SnapshotResult<Box<dyn SnapshotStore>> {
    if config.dry_run {
        return Ok(Box::new(DryRunStore));
    }
    let credentials = config.store.clone().ok_or_else(|| {
        SnapshotError::Configuration("SUPABASE_URL and SUPABASE_KEY must be set".into())
    })?;
    Ok(Box::new(PostgrestStore::new(client, credentials)?))
}
