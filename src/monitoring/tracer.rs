/*!
 * Structured Tracing
 * Subscriber set-up and per-tick spans using the tracing crate
 */

use tracing::{info, span, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SIM_TRACE_JSON: Enable JSON output (default: false)
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_span_events(FmtSpan::NONE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "structured tracing initialized");
    }
}

/// Generate a unique run ID for correlating one simulation's log lines
pub fn generate_run_id() -> Uuid {
    Uuid::new_v4()
}

/// Span covering one `update` call
#[inline]
pub fn span_tick(run_id: &Uuid, now: u64) -> Span {
    span!(Level::DEBUG, "tick", run_id = %run_id, now = now)
}

/// Span covering one controller invocation
#[inline]
pub fn span_controller(name: &str, events: usize) -> Span {
    span!(
        Level::DEBUG,
        "controller",
        controller = name,
        events = events,
        actions = tracing::field::Empty
    )
}
