//! Tracing and logging setup shared by the storefront binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, ObservabilityConfig};

/// Initialize process-wide tracing from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    init_with(&ObservabilityConfig::from_env());
}

/// Initialize process-wide tracing from an explicit configuration.
pub fn init_with(config: &ObservabilityConfig) {
    tracing::init(config);
}
