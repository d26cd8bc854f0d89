/*!
 * Structured Tracing
 * Subscriber setup for the tracing events emitted by the primitives
 *
 * The primitives only emit events (`debug!` on construction/placement,
 * `trace!` on contended paths, `error!` on suppressed failures); installing
 * a subscriber is left to the application, or done here.
 */

use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter,
};

/// Environment variable enabling JSON output
pub const TRACE_JSON_ENV: &str = "FUTEX_SYNC_TRACE_JSON";

fn json_requested() -> bool {
    std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false)
}

/// Install the global subscriber, failing if one is already set
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - FUTEX_SYNC_TRACE_JSON: Enable JSON output (default: false)
pub fn try_init_tracing() -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json_requested() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?;
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
        info!("Structured tracing initialized");
    }

    Ok(())
}

/// Install the global subscriber; a second call is a no-op
pub fn init_tracing() {
    let _ = try_init_tracing();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing();
        // Second install must fail instead of panicking
        assert!(try_init_tracing().is_err());
        tracing::debug!("tracing still usable");
    }
}
