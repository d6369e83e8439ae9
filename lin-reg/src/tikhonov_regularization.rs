use common::{validate_sequence, SequenceView};
use nalgebra::{DMatrix, Dim, Matrix};

use super::{LinReg, LinRegError};

/// Tikhonov regularization aka ridge regression
/// It is particularly useful to mitigate the problem of multicollinearity
/// between reservoir neurons
#[derive(Debug, Clone)]
pub struct TikhonovRegularization {
    /// Ridge parameter
    pub regularization_coeff: f64,
}

impl LinReg for TikhonovRegularization {
    fn fit_readout(
        &self,
        design: &SequenceView,
        targets: &SequenceView,
    ) -> Result<DMatrix<f64>, LinRegError> {
        let (design_rows, design_cols) = validate_sequence(design)?;
        let (target_rows, _) = validate_sequence(targets)?;
        if design_rows != target_rows {
            return Err(LinRegError::RowMismatch {
                design: design_rows,
                targets: target_rows,
            });
        }

        let reg_m: DMatrix<f64> = Matrix::from_diagonal_element_generic(
            Dim::from_usize(design_cols),
            Dim::from_usize(design_cols),
            self.regularization_coeff,
        );

        let p0 = design.transpose() * design;
        let p1 = (p0 + reg_m).try_inverse().ok_or(LinRegError::Singular(design_cols))?;
        let p2 = design.transpose() * targets;
        debug!("fitted readout over {} rows and {} columns", design_rows, design_cols);

        Ok(p1 * p2)
    }
}
