//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the global subscriber: compact stdout output, level filtered
/// through `RUST_LOG` with an `info` default. Calling twice is a no-op.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("default env filter must parse");

    let stdout_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(stdout_layer).try_init();
}
