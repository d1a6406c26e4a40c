//! Tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a global fmt subscriber.
///
/// The filter comes from `QUAKESPHERE_LOG`, then `RUST_LOG`, else `info`
/// (`debug` when `verbose`). Calling this twice keeps the first subscriber.
pub fn init_logging(verbose: bool) {
    let filter = std::env::var("QUAKESPHERE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {e}");
    }
}
