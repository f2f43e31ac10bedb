/// Install the global `tracing` subscriber
///
/// `RUST_LOG` selects what is printed and defaults to `info`. Logs go to stderr so
/// that command output on stdout stays machine-readable.
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    // A subscriber may already be installed when embedded in another binary
    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        tracing::debug!("Global tracing subscriber already set");
    }
}
