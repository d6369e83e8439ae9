//! Linear readouts fitted on top of reservoir echoes

#[macro_use]
extern crate log;

use common::{SequenceView, ValidationError};
use nalgebra::{DMatrix, Dim, Matrix};
use thiserror::Error;

mod tikhonov_regularization;

pub use tikhonov_regularization::TikhonovRegularization;

/// Ways a readout fit can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinRegError {
    /// Design and targets must describe the same time steps
    #[error("design has {design} rows but targets have {targets}")]
    RowMismatch {
        /// Rows of the design matrix
        design: usize,
        /// Rows of the target matrix
        targets: usize,
    },

    /// The (regularized) normal matrix could not be inverted
    #[error("normal matrix of dimension {0} is singular")]
    Singular(usize),

    /// Malformed design or targets
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Generic way of performing linear regression and fitting the readout matrix
pub trait LinReg: Clone {
    /// Fit a readout matrix, mapping design rows to target rows
    ///
    /// # Parameters
    /// design: One row per time step, usually with a leading column of 1s
    /// targets: One row per time step, O columns as the output dimensionality
    ///
    /// # Returns
    /// The readout matrix of shape (design.ncols(), targets.ncols())
    fn fit_readout(
        &self,
        design: &SequenceView,
        targets: &SequenceView,
    ) -> Result<DMatrix<f64>, LinRegError>;
}

/// Prepend a column of 1s, so the readout can learn an offset
pub fn with_bias_column(echoes: &SequenceView) -> DMatrix<f64> {
    Matrix::from_fn_generic(
        Dim::from_usize(echoes.nrows()),
        Dim::from_usize(echoes.ncols() + 1),
        |i, j| {
            if j == 0 {
                1.0
            } else {
                echoes[(i, j - 1)]
            }
        },
    )
}

/// Apply a fitted readout matrix to a design matrix
#[inline]
pub fn predict(design: &SequenceView, readout: &DMatrix<f64>) -> DMatrix<f64> {
    design * readout
}

/// Root mean squared error over all elements
pub fn rmse(predictions: &DMatrix<f64>, targets: &SequenceView) -> f64 {
    debug_assert_eq!(predictions.shape(), targets.shape());
    if predictions.is_empty() {
        return 0.0;
    }
    let sse: f64 = predictions.iter().zip(targets.iter()).map(|(p, t)| (p - t).powi(2)).sum();

    (sse / predictions.len() as f64).sqrt()
}
