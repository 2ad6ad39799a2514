//! Logger setup based on tracing / tracing-subscriber.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// The filter defaults to `<bin_name>=<default_level>` plus warnings from
/// dependencies, and can be overridden with the `RUST_LOG` environment
/// variable.
///
/// # Arguments
///
/// * `bin_name` - Name of the binary, used as the default filter target
/// * `default_level` - Default log level (e.g. "debug", "info")
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let default_directive = format!(
        "warn,{}={level},kokuban_server={level},kokuban_shared={level}",
        bin_name.replace('-', "_"),
        level = default_level
    );

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
