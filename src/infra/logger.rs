// src/infra/logger.rs — Structured logging with tracing
//
// Everything goes to stderr: stdout carries only the run report, which must
// stay parseable under `--json`.

use tracing_subscriber::{fmt, EnvFilter};

/// Directive used when `RUST_LOG` is unset.
pub fn default_directive(level: &str, quiet: bool) -> &str {
    if quiet {
        "error"
    } else {
        level
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `level` and `quiet`.
/// Calling it again after a subscriber is installed does nothing.
pub fn init_logging(level: &str, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level, quiet)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
