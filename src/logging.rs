use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. Defaults to `info` unless
/// overridden via `RUST_LOG`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();
}
