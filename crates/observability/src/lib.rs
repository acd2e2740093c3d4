//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing from `RUST_LOG` and `LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() -> Result<(), ObservabilityError> {
    let format = LogFormat::from_env()?;
    tracing::init(format);
    Ok(())
}

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use tracing::{LogFormat, ObservabilityError};
