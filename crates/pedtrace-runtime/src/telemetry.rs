//! Tracing initialisation for the pedtrace binaries.
//!
//! Call [`init_tracing`] once at process startup, before the Tokio runtime
//! is created.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `PEDTRACE_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |

use tracing_subscriber::EnvFilter;

/// Initialise the global `tracing` subscriber.
///
/// Safe to call more than once; subsequent calls are no-ops (the first
/// registered subscriber wins).
pub fn init_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    if std::env::var("PEDTRACE_LOG_FORMAT").as_deref() == Ok("json") {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        // Double initialisation must not panic; the second call is a no-op.
        init_tracing();
        init_tracing();
    }
}
