//! Error types for Thumbgrid core systems.

use thiserror::Error;

/// Errors raised by the core timer system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The timer ID is invalid or has already been removed.
    #[error("invalid or expired timer ID")]
    InvalidTimerId,
}

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CoreError::InvalidTimerId.to_string(),
            "invalid or expired timer ID"
        );
    }
}
