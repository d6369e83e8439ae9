use nalgebra::{DMatrix, Schur};

use crate::EsnError;

/// Upper bound on QR sweeps of the Schur decomposition, per matrix dimension
const MAX_SCHUR_SWEEPS_PER_DIM: usize = 1_000;

/// The largest modulus among the (possibly complex) eigenvalues of a square matrix.
/// The reservoir weights are not symmetric, so the eigenvalues are read off the real Schur form.
pub fn spectral_radius(matrix: &DMatrix<f64>) -> Result<f64, EsnError> {
    if !matrix.is_square() {
        return Err(EsnError::Numerical(format!(
            "spectral radius of non square matrix ({}, {})",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    // the QR sweeps never deflate an all zero matrix
    if matrix.amax() == 0.0 {
        return Ok(0.0);
    }
    let max_niter = MAX_SCHUR_SWEEPS_PER_DIM * matrix.nrows().max(1);
    let schur = Schur::try_new(matrix.clone(), f64::EPSILON, max_niter).ok_or_else(|| {
        EsnError::Numerical(format!(
            "schur decomposition did not converge within {} iterations",
            max_niter
        ))
    })?;

    Ok(schur.complex_eigenvalues().iter().map(|ev| ev.re.hypot(ev.im)).fold(0.0, f64::max))
}
