/*!
 * Structured Tracing
 * Subscriber setup and per-process spans
 */

use crate::core::limits::ENV_TRACE_JSON;
use crate::core::types::Pid;
use tracing::{info, span, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the global subscriber
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - COOP_TRACE_JSON: Enable JSON output (default: false)
///
/// Panics if a global subscriber is already set; see [`try_init_tracing`].
pub fn init_tracing() {
    if !try_init_tracing() {
        panic!("global tracing subscriber already installed");
    }
}

/// Install the global subscriber unless one is already set
///
/// Returns whether this call installed it.
pub fn try_init_tracing() -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Span covering one stepping pass over a process
///
/// Events emitted by continuations and effect starters inherit the pid.
pub fn process_span(pid: Pid) -> Span {
    span!(Level::TRACE, "process", pid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::trace;

    fn init_test_tracing() {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new("trace"))
            .with(tracing_subscriber::fmt::layer().with_test_writer().compact())
            .try_init();
    }

    #[test]
    fn test_try_init_is_idempotent() {
        init_test_tracing();
        assert!(!try_init_tracing());
    }

    #[test]
    fn test_process_span_can_be_entered() {
        init_test_tracing();
        let span = process_span(7);
        let _entered = span.enter();
        trace!("inside process span");
    }
}
