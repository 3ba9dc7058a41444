//! CLI argument parsing for the snapshot job.
//!
//! Uses clap for argument parsing with environment variable fallbacks, so the
//! job can be driven entirely from a scheduler's environment.

use clap::{Parser, ValueHint};

pub const DEFAULT_SOURCE_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";

/// Market snapshot - fetch the top coins by market cap and upsert them
///
/// Pages through the market-data source until the target count is reached,
/// deduplicates by the conflict key and writes the result to the store in
/// fixed-size batches.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct SnapshotArgs {
    /// Markets endpoint of the data source
    #[arg(
        long = "source-url",
        env = "COINGECKO_MARKETS_URL",
        value_hint = ValueHint::Url,
        default_value = DEFAULT_SOURCE_URL
    )]
    pub source_url: String,

    /// Quote currency for prices and market caps
    #[arg(long = "vs-currency", env = "VS_CURRENCY", default_value = "usd")]
    pub vs_currency: String,

    /// Records requested per page
    #[arg(long = "page-size", env = "PAGE_SIZE", default_value = "250")]
    pub page_size: usize,

    /// Number of records the snapshot is trimmed to
    #[arg(long = "target-count", env = "TARGET_COUNT", default_value = "1250")]
    pub target_count: usize,

    /// Records sent per upsert call
    #[arg(long = "batch-size", env = "BATCH_SIZE", default_value = "200")]
    pub batch_size: usize,

    /// Destination table
    #[arg(long = "table", env = "SNAPSHOT_TABLE", default_value = "snapshot")]
    pub table: String,

    /// Column the store resolves conflicts on; also the dedup key
    #[arg(long = "conflict-key", env = "CONFLICT_KEY", default_value = "id")]
    pub conflict_key: String,

    /// Base URL of the store (e.g. https://<project>.supabase.co)
    #[arg(long = "store-url", env = "SUPABASE_URL", value_hint = ValueHint::Url)]
    pub store_url: Option<String>,

    /// Service key for the store
    #[arg(long = "store-key", env = "SUPABASE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// Optional CoinGecko API key
    #[arg(long = "coingecko-api-key", env = "COINGECKO_API_KEY", hide_env_values = true)]
    pub coingecko_api_key: Option<String>,

    /// Per-request HTTP timeout in seconds (0 = no timeout)
    #[arg(long = "http-timeout-secs", env = "HTTP_TIMEOUT_SECS", default_value = "30")]
    pub http_timeout_secs: u64,

    /// Run the whole pipeline but log batches instead of writing them
    #[arg(long = "dry-run", env = "SNAPSHOT_DRY_RUN", default_value = "false")]
    pub dry_run: bool,
}
