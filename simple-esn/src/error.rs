use common::ValidationError;
use thiserror::Error;

/// Everything that can go wrong when initializing or driving the reservoir
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EsnError {
    /// Invalid parameters, detected at construction or initialization
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The sequence does not have the number of features the weights were drawn for
    #[error("reservoir was initialized for {expected} features, got {found}")]
    DimensionMismatch {
        /// Features seen at initialization
        expected: usize,
        /// Features of the offending sequence
        found: usize,
    },

    /// Degenerate weights or an unstable recurrence
    #[error("numerical failure: {0}")]
    Numerical(String),

    /// Malformed input sequence
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
