//! Logger initialization for the analysis CLI
//! Author: kartik4091
//! Created: 2025-06-05

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// Output goes to stderr so stdout carries only the diagnostics. `RUST_LOG`
/// takes precedence over `level` when set. Calling this twice is harmless;
/// the second installation attempt is ignored.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tamperscan={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
