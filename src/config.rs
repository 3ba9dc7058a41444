//! Validated run configuration.
//!
//! [`SnapshotArgs`] is whatever the environment handed us; [`SnapshotConfig`]
//! is what the pipeline runs with. Conversion happens once at startup and any
//! problem surfaces as [`SnapshotError::Configuration`] before the first fetch.

use crate::args::SnapshotArgs;
use crate::error::{SnapshotError, SnapshotResult};
use derive_builder::Builder;
use reqwest::Url;
use std::fmt;
use std::time::Duration;
use tracing::info;

#[derive(Builder, Clone, Debug)]
#[builder(build_fn(validate = "Self::validate", error = "SnapshotError"))]
pub struct SnapshotConfig {
    /// Markets endpoint of the data source
    pub source_url: Url,
    #[builder(setter(into), default = "String::from(\"usd\")")]
    pub vs_currency: String,
    #[builder(default = "250")]
    pub page_size: usize,
    #[builder(default = "1250")]
    pub target_count: usize,
    #[builder(default = "200")]
    pub batch_size: usize,
    #[builder(setter(into), default = "String::from(\"snapshot\")")]
    pub table: String,
    /// Dedup key and store conflict column
    #[builder(setter(into), default = "String::from(\"id\")")]
    pub conflict_key: String,
    /// `None` only in dry-run mode
    #[builder(default)]
    pub store: Option<StoreCredentials>,
    #[builder(setter(into, strip_option), default)]
    pub coingecko_api_key: Option<String>,
    #[builder(default = "Some(Duration::from_secs(30))")]
    pub http_timeout: Option<Duration>,
    #[builder(default)]
    pub dry_run: bool,
}

#[derive(Clone)]
pub struct StoreCredentials {
    pub url: Url,
    pub key: String,
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("url", &self.url.as_str())
            .field("key", &"<redacted>")
            .finish()
    }
}

impl From<derive_builder::UninitializedFieldError> for SnapshotError {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        SnapshotError::Configuration(format!("{} must be set", err.field_name()))
    }
}

impl SnapshotConfigBuilder {
    fn validate(&self) -> Result<(), SnapshotError> {
        if self.page_size == Some(0) {
            return Err(SnapshotError::Configuration(
                "page size must be at least 1".into(),
            ));
        }
        if self.batch_size == Some(0) {
            return Err(SnapshotError::Configuration(
                "batch size must be at least 1".into(),
            ));
        }
        let dry_run = self.dry_run.unwrap_or(false);
        let has_store = matches!(self.store, Some(Some(_)));
        if !dry_run && !has_store {
            return Err(SnapshotError::Configuration(
                "SUPABASE_URL and SUPABASE_KEY must be set (or use --dry-run)".into(),
            ));
        }
        Ok(())
    }
}

impl SnapshotConfig {
    pub fn builder() -> SnapshotConfigBuilder {
        SnapshotConfigBuilder::default()
    }

    /// Validate raw arguments into a run configuration.
    pub fn from_args(args: SnapshotArgs) -> SnapshotResult<Self> {
        let source_url = parse_url("source URL", &args.source_url)?;

        let store_url = args.store_url.filter(|s| !s.trim().is_empty());
        let store_key = args.store_key.filter(|s| !s.trim().is_empty());
        let store = match (store_url, store_key) {
            (Some(url), Some(key)) => Some(StoreCredentials {
                url: parse_url("store URL", &url)?,
                key,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(SnapshotError::Configuration(
                    "SUPABASE_KEY must be set".into(),
                ))
            }
            (None, Some(_)) => {
                return Err(SnapshotError::Configuration(
                    "SUPABASE_URL must be set".into(),
                ))
            }
        };

        let mut builder = Self::builder();
        builder
            .source_url(source_url)
            .vs_currency(args.vs_currency)
            .page_size(args.page_size)
            .target_count(args.target_count)
            .batch_size(args.batch_size)
            .table(args.table)
            .conflict_key(args.conflict_key)
            .store(store)
            .dry_run(args.dry_run);
        if let Some(key) = args.coingecko_api_key.filter(|s| !s.is_empty()) {
            builder.coingecko_api_key(key);
        }
        builder.http_timeout(
            (args.http_timeout_secs > 0).then(|| Duration::from_secs(args.http_timeout_secs)),
        );
        builder.build()
    }

    /// Log the effective settings, secrets redacted.
    pub fn log_summary(&self) {
        info!("Snapshot configuration:");
        info!("  Source: {} ({})", self.source_url, self.vs_currency);
        info!(
            "  Pages: {} per page, target {} records",
            self.page_size, self.target_count
        );
        info!(
            "  Store: {} table={} conflict_key={} batch_size={}",
            self.store
                .as_ref()
                .map(|s| s.url.as_str())
                .unwrap_or("<none>"),
            self.table,
            self.conflict_key,
            self.batch_size
        );
        if self.dry_run {
            info!("  Dry run: batches will be logged, not written");
        }
    }
}

fn parse_url(what: &str, raw: &str) -> SnapshotResult<Url> {
    Url::parse(raw.trim())
        .map_err(|e| SnapshotError::Configuration(format!("invalid {what} '{raw}': {e}")))
}
