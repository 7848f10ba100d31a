//! Error types for the prediction engine.
//!
//! Only contract violations surface as errors. A missing prediction is a normal
//! outcome and is reported as an empty result, never through this enum.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictorError {
    /// A required string input was absent, empty or blank.
    #[error("argument '{name}' must not be empty")]
    InvalidArgument { name: &'static str },

    /// A required reference input was absent.
    #[error("argument '{name}' must be provided")]
    NullArgument { name: &'static str },

    /// A numeric budget was not strictly positive.
    #[error("argument '{name}' must be greater than zero (got {value})")]
    OutOfRange { name: &'static str, value: i64 },
}
