use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset; keeps sqlx's per-statement logging out of
/// report runs.
const DEFAULT_FILTER: &str = "review_service=info,sqlx=warn";

/// Logs go to stderr; stdout carries the JSON report.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
