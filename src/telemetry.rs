//! Logging setup.
//!
//! Everything goes to stderr through `tracing-subscriber`. `RUST_LOG` wins
//! when set; otherwise `--verbose` lowers the crate's level to debug.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "fizzy_pop=debug,info" } else { "fizzy_pop=info,warn" }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
