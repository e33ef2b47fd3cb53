use thiserror::Error;

/// Rejected task configuration. Engines never clamp degenerate values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: u64,
        value: u64,
    },

    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("nValue ({n}) must be smaller than sequenceLength ({length})")]
    LagTooLarge { n: usize, length: usize },

    #[error("invalid target time {0:?}, expected HH:MM")]
    InvalidTime(String),
}

impl ConfigError {
    /// Convenience check for a lower bound on an integer option.
    pub fn at_least(field: &'static str, value: u64, min: u64) -> Result<(), ConfigError> {
        if value < min {
            Err(ConfigError::TooSmall { field, min, value })
        } else {
            Ok(())
        }
    }
}
