//! Tracing setup shared by the Taper binaries.
//!
//! Log output goes to stderr so command output on stdout stays scriptable.
//! `TAPER_LOG` takes precedence over the verbosity-derived default.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV_VAR: &str = "TAPER_LOG";

/// Map a `-v` count to a default filter directive
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize logging for a binary
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
