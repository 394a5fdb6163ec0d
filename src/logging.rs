//! Logging setup for the `thumbgal` binary.
//!
//! Diagnostics go to stderr through `tracing`; stdout carries the build
//! report only. `RUST_LOG` overrides the level chosen from the flags.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// Without `verbose` only warnings (skipped images, cache trouble) are
/// shown; with it, per-page and per-thumbnail debug events too.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
