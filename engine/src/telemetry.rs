//! Telemetry and Observability
//!
//! Handles setting up `tracing-subscriber` for structured logging.
//! Supports config-driven log levels, environment variable overrides,
//! and format switching between pretty (debug) and JSON (release).
//!
//! The `quill` binary prints rendered markup and JSON events on stdout, so all
//! logging goes to stderr. The chat panel polls its room twice a second;
//! the HTTP stack is held at `warn` so a `debug` session shows Quill's own
//! request and re-render events rather than per-connection noise.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber with the given log level from config.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter > default "info"
///
/// Logs go to stderr so that rendered output on stdout stays clean.
pub fn init_telemetry_with_level(log_level: &str) {
    let fallback = default_filter(log_level);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&fallback));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }
}

/// Filter used when `RUST_LOG` is unset
fn default_filter(log_level: &str) -> String {
    format!(
        "{level},quill_engine={level},hyper=warn,reqwest=warn",
        level = log_level
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_http_stack() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("debug,quill_engine=debug"));
        assert!(filter.contains("hyper=warn"));
        assert!(EnvFilter::try_new(&filter).is_ok());
    }
}
