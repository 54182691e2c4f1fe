//! Tracing setup for the `pointbridge` binary.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directives.
pub const LOG_ENV: &str = "POINTBRIDGE_LOG";

/// Filter from `POINTBRIDGE_LOG`, falling back to `info`. `verbose` forces
/// `debug` regardless of the environment.
pub fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a stderr subscriber. A subscriber that is already installed wins.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .try_init();
}
