use nalgebra::{DMatrix, DMatrixView, Dim, Matrix};

/// Per step state of one propagation, of shape (1 + n_features + n_components, n_samples).
/// Column t stacks the bias (constant 1), the input and the reservoir activation of step t.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTrace {
    components: DMatrix<f64>,
    n_features: usize,
}

impl StateTrace {
    pub(crate) fn new(components: DMatrix<f64>, n_features: usize) -> Self {
        Self {
            components,
            n_features,
        }
    }

    /// The full trace
    #[inline(always)]
    pub fn components(&self) -> &DMatrix<f64> {
        &self.components
    }

    /// Number of propagated time steps
    #[inline(always)]
    pub fn n_steps(&self) -> usize {
        self.components.ncols()
    }

    /// Bias row followed by the input rows
    pub fn augmented_inputs(&self) -> DMatrixView<'_, f64> {
        self.components.rows(0, 1 + self.n_features)
    }

    /// Activation rows of the reservoir neurons
    pub fn activations(&self) -> DMatrixView<'_, f64> {
        let offset = 1 + self.n_features;
        self.components.rows(offset, self.components.nrows() - offset)
    }

    /// Select the readout rows and drop the warm-up steps.
    ///
    /// # Returns:
    /// A matrix of shape (n_steps - discard_steps, readout_indices.len()), where
    /// column j holds the trace row `readout_indices[j]`.
    /// Discarding all steps yields zero rows.
    pub fn readout(&self, readout_indices: &[usize], discard_steps: usize) -> DMatrix<f64> {
        let n_rows = self.n_steps().saturating_sub(discard_steps);
        if n_rows == 0 {
            warn!(
                "discarding {} of {} steps leaves an empty readout",
                discard_steps,
                self.n_steps()
            );
        }

        Matrix::from_fn_generic(
            Dim::from_usize(n_rows),
            Dim::from_usize(readout_indices.len()),
            |i, j| self.components[(readout_indices[j], discard_steps + i)],
        )
    }
}
