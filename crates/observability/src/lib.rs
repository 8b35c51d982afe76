//! Process-wide logging setup shared by every storefront binary.

/// Initialise logging with JSON output and the `info` default level.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    self::tracing::init(LogFormat::Json, self::tracing::DEFAULT_DIRECTIVE);
}

pub use self::tracing::{LogFormat, init_with};

/// Subscriber construction (filter, format, writer).
pub mod tracing;
