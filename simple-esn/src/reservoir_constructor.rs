use std::ops::Range;

use nalgebra::{DMatrix, Dim, Matrix};
use nanorand::{Rng, WyRand};

/// Provides the abstraction needed for custom implementations of the reservoir generation process.
/// The reservoir calls these in a fixed order on every initialization:
/// reservoir weights, input weights, readout candidates.
pub trait ReservoirConstructor {
    /// Draw the unscaled recurrent weights of shape (n_components, n_components)
    fn construct_reservoir_weights(&mut self, n_components: usize) -> DMatrix<f64>;

    /// Draw the input weights of shape (n_components, n_inputs),
    /// where the first input is the constant bias
    fn construct_input_weight_matrix(&mut self, n_components: usize, n_inputs: usize)
        -> DMatrix<f64>;

    /// Return all neuron indices of the given range in a random order
    fn construct_readout_candidates(&mut self, neurons: Range<usize>) -> Vec<usize>;
}

/// Draws all weights uniformly from [-0.5, 0.5) and readout neurons by random permutation
#[derive(Debug, Clone)]
pub struct UniformConstructor {
    rng: WyRand,
}

impl UniformConstructor {
    /// Create a new constructor, seeded from system entropy if no seed is given
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };

        Self { rng }
    }

    /// A uniform draw from [-0.5, 0.5), using the upper 53 bits of the generator output
    #[inline]
    fn centered_uniform(&mut self) -> f64 {
        (self.rng.generate::<u64>() >> 11) as f64 / (1u64 << 53) as f64 - 0.5
    }
}

impl ReservoirConstructor for UniformConstructor {
    fn construct_reservoir_weights(&mut self, n_components: usize) -> DMatrix<f64> {
        Matrix::from_fn_generic(
            Dim::from_usize(n_components),
            Dim::from_usize(n_components),
            |_, _| self.centered_uniform(),
        )
    }

    fn construct_input_weight_matrix(
        &mut self,
        n_components: usize,
        n_inputs: usize,
    ) -> DMatrix<f64> {
        Matrix::from_fn_generic(Dim::from_usize(n_components), Dim::from_usize(n_inputs), |_, _| {
            self.centered_uniform()
        })
    }

    fn construct_readout_candidates(&mut self, neurons: Range<usize>) -> Vec<usize> {
        let mut candidates: Vec<usize> = neurons.collect();
        self.rng.shuffle(&mut candidates);

        candidates
    }
}
