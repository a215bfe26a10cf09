//! Logging setup for binaries that embed the tracker.

use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// Multi-line output for local debugging.
    Pretty,
}

/// Installs the global subscriber. `RUST_LOG` controls levels, default `info`.
/// Calls after the first are no-ops.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let result = match format {
            LogFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact())
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .try_init(),
        };

        // Another subscriber may already be installed by the host program.
        if let Err(e) = result {
            tracing::debug!("logging already initialized: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent_next_to_a_host_subscriber() {
        // The host got there first; ours must back off without panicking.
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        init_logging(LogFormat::Compact);
        init_logging(LogFormat::Pretty);
        assert!(INIT.is_completed());

        tracing::info!("still logging after repeated init");
    }
}
