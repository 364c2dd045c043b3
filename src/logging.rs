//! Logging setup.
//!
//! The library only emits `tracing` events; binaries and tests decide where
//! they go by calling [`init_logging`] once.

use std::sync::Once;

use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON lines, for log shippers
    Json,
    /// Human-readable, for terminals
    #[default]
    Pretty,
}

/// Install the global subscriber.
///
/// Level filtering follows `RUST_LOG` (default `info`). Later calls are no-ops.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let registry = tracing_subscriber::registry().with(env_filter);
        // Another subscriber may already be installed by the host process.
        let _ = match format {
            LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
            LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        };
    });
}

/// Span wrapping one allocation run
#[must_use]
pub fn allocation_span(mode: &'static str, inputs: usize, outputs: usize) -> Span {
    tracing::info_span!("allocation", mode, inputs, outputs)
}
