use tracing_subscriber::EnvFilter;

pub(crate) const DEFAULT_FILTER: &str = "info";

/// Init logging using tracing subscriber, `RUST_LOG` first, `info` otherwise.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
