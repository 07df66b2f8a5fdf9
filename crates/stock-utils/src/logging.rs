//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with default configuration
///
/// Honors `RUST_LOG` when set, otherwise logs at `info`.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Initialize tracing with a fallback filter used when `RUST_LOG` is unset
pub fn init_tracing_with_default(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Install a subscriber that writes through the test harness
///
/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
