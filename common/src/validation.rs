use thiserror::Error;

use crate::SequenceView;

/// Rejections of malformed input sequences
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The sequence needs at least one sample and one feature
    #[error("expected a non-empty sequence, got shape ({n_samples}, {n_features})")]
    Empty {
        /// Number of rows observed
        n_samples: usize,
        /// Number of columns observed
        n_features: usize,
    },

    /// NaN or infinity found in the sequence
    #[error("non-finite value at row {row}, column {col}")]
    NonFinite {
        /// Time step of the offending value
        row: usize,
        /// Feature of the offending value
        col: usize,
    },
}

/// Checks that a sequence has at least one sample, at least one feature
/// and only finite values.
///
/// # Returns:
/// The shape of the sequence as (n_samples, n_features)
pub fn validate_sequence(sequence: &SequenceView) -> Result<(usize, usize), ValidationError> {
    let (n_samples, n_features) = sequence.shape();
    if n_samples == 0 || n_features == 0 {
        return Err(ValidationError::Empty {
            n_samples,
            n_features,
        });
    }

    for row in 0..n_samples {
        for col in 0..n_features {
            if !sequence[(row, col)].is_finite() {
                return Err(ValidationError::NonFinite { row, col });
            }
        }
    }

    Ok((n_samples, n_features))
}
