//! Custom error types for the crate.
//!
//! This module defines the primary error type, `ScopeError`, using the
//! `thiserror` crate. Transport-level failures arrive as `anyhow::Error`
//! from the adapter layer and are wrapped via `#[from]`, so driver code can
//! propagate them with the `?` operator.
//!
//! Soft failures (instrument not connected) are NOT errors: acquisition
//! functions return `Ok(None)` in that case.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type ScopeResult<T> = std::result::Result<T, ScopeError>;

/// Error type covering configuration, argument validation, reply parsing
/// and transport failures.
#[derive(Error, Debug)]
pub enum ScopeError {
    /// Settings file or environment override failed to load.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Channel number outside the fixed channel set; raised before any
    /// instrument I/O.
    #[error("Invalid channel {0}: this scope has channels 1 and 2")]
    InvalidChannel(u8),

    /// A numeric instrument reply did not parse.
    #[error("Failed to parse {field} reply: '{reply}'")]
    Parse {
        /// SCPI query the reply belongs to.
        field: &'static str,
        /// Offending reply text.
        reply: String,
    },

    /// Two sequences that must be equal length were not.
    #[error("Waveform length mismatch: {0} != {1}")]
    LengthMismatch(usize, usize),

    /// Transport-level I/O failure, propagated uncaught from the adapter.
    #[error("Transport error: {0}")]
    Transport(#[from] anyhow::Error),

    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure.
    #[cfg(feature = "storage_csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Functionality compiled out by a cargo feature.
    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_channel_display() {
        let err = ScopeError::InvalidChannel(7);
        assert_eq!(
            err.to_string(),
            "Invalid channel 7: this scope has channels 1 and 2"
        );
    }

    #[test]
    fn test_parse_error_names_field() {
        let err = ScopeError::Parse {
            field: "wfmpre:xincr?",
            reply: "garbage".into(),
        };
        assert!(err.to_string().contains("wfmpre:xincr?"));
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn test_transport_error_wraps_anyhow() {
        let err: ScopeError = anyhow::anyhow!("VISA query failed").into();
        assert!(err.to_string().contains("VISA query failed"));
    }
}
