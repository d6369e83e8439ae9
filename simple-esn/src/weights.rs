use common::{validate_sequence, SequenceView};
use nalgebra::{DMatrix, Dim, Matrix};

use crate::{spectral_radius, EsnError, Params, ReservoirConstructor, StateMatrix, StateTrace};

/// The fixed weights of an initialized reservoir.
/// Never mutated after initialization, so a shared reference can drive
/// any number of sequences, also from multiple threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservoirWeights {
    /// shape (n_components, 1 + n_features), the first column weights the bias
    input_weights: DMatrix<f64>,
    /// shape (n_components, n_components), scaled to the target spectral radius
    reservoir_weights: DMatrix<f64>,
    /// rows of the state trace exposed as output, in output column order
    readout_indices: Vec<usize>,
    n_features: usize,
}

impl ReservoirWeights {
    /// Draw a new set of weights for sequences with `n_features` features.
    /// Consumes the constructor's random draws in the order:
    /// reservoir weights, input weights, readout permutation.
    pub fn initialize<C>(
        params: &Params,
        n_features: usize,
        constructor: &mut C,
    ) -> Result<Self, EsnError>
    where
        C: ReservoirConstructor,
    {
        params.validate()?;
        if n_features == 0 {
            return Err(EsnError::Configuration("n_features must be at least 1".to_string()));
        }
        let n_components = params.n_components;

        let mut reservoir_weights = constructor.construct_reservoir_weights(n_components);
        debug_assert_eq!(reservoir_weights.shape(), (n_components, n_components));
        let spec_rad = spectral_radius(&reservoir_weights)?;
        if spec_rad == 0.0 || !spec_rad.is_finite() {
            return Err(EsnError::Numerical(format!(
                "cannot scale reservoir weights with spectral radius {}",
                spec_rad
            )));
        }
        reservoir_weights *= params.weight_scaling / spec_rad;
        debug!(
            "drew reservoir of {} neurons, spectral radius {} scaled to {}",
            n_components, spec_rad, params.weight_scaling
        );

        let input_weights = constructor.construct_input_weight_matrix(n_components, 1 + n_features);
        debug_assert_eq!(input_weights.shape(), (n_components, 1 + n_features));

        let first_neuron = 1 + n_features;
        let mut readout_indices =
            constructor.construct_readout_candidates(first_neuron..first_neuron + n_components);
        readout_indices.truncate(params.n_readout);

        trace!(
            "input_weights: {}\nreservoir_weights: {}\nreadout_indices: {:?}",
            input_weights,
            reservoir_weights,
            readout_indices
        );

        Ok(Self {
            input_weights,
            reservoir_weights,
            readout_indices,
            n_features,
        })
    }

    /// Run the leaky tanh recurrence over the whole sequence, starting from a resting state.
    ///
    /// # Arguments:
    /// inputs: One row per time step, `n_features` columns
    /// damping: Interpolation between previous and new activation
    ///
    /// # Returns:
    /// The trace holding bias, input and reservoir activation of every step
    pub fn propagate(&self, inputs: &SequenceView, damping: f64) -> Result<StateTrace, EsnError> {
        let shape = validate_sequence(inputs)?;

        self.propagate_validated(inputs, shape, damping)
    }

    /// `propagate` for a sequence already known to be valid, of shape (n_samples, n_features)
    pub(crate) fn propagate_validated(
        &self,
        inputs: &SequenceView,
        (n_samples, n_features): (usize, usize),
        damping: f64,
    ) -> Result<StateTrace, EsnError> {
        if !(0.0..=1.0).contains(&damping) {
            return Err(EsnError::Configuration(format!(
                "damping must lie in [0, 1], got {}",
                damping
            )));
        }
        if n_features != self.n_features {
            return Err(EsnError::DimensionMismatch {
                expected: self.n_features,
                found: n_features,
            });
        }
        let n_inputs = 1 + n_features;
        let n_components = self.n_components();

        let mut components: DMatrix<f64> = Matrix::zeros_generic(
            Dim::from_usize(n_inputs + n_components),
            Dim::from_usize(n_samples),
        );
        let mut state = StateMatrix::zeros(n_components);

        for t in 0..n_samples {
            // prepend the 1 of the bias neuron
            let input = StateMatrix::from_fn(n_inputs, |i, _| {
                if i == 0 {
                    1.0
                } else {
                    inputs[(t, i - 1)]
                }
            });
            let state_delta =
                (&self.input_weights * &input + &self.reservoir_weights * &state).map(f64::tanh);
            state = (1.0 - damping) * state + damping * state_delta;

            if let Some(neuron) = state.iter().position(|a| !a.is_finite()) {
                return Err(EsnError::Numerical(format!(
                    "activation of neuron {} became non-finite at step {}",
                    neuron, t
                )));
            }

            components.view_mut((0, t), (n_inputs, 1)).copy_from(&input);
            components.view_mut((n_inputs, t), (n_components, 1)).copy_from(&state);
        }
        debug!(
            "propagated {} steps, trace dims: ({}, {})",
            n_samples,
            components.nrows(),
            components.ncols()
        );

        Ok(StateTrace::new(components, n_features))
    }

    /// Propagate the sequence and extract the readout neurons, dropping `discard_steps` steps
    pub fn echo(
        &self,
        inputs: &SequenceView,
        damping: f64,
        discard_steps: usize,
    ) -> Result<DMatrix<f64>, EsnError> {
        let shape = validate_sequence(inputs)?;

        self.echo_validated(inputs, shape, damping, discard_steps)
    }

    pub(crate) fn echo_validated(
        &self,
        inputs: &SequenceView,
        shape: (usize, usize),
        damping: f64,
        discard_steps: usize,
    ) -> Result<DMatrix<f64>, EsnError> {
        let trace = self.propagate_validated(inputs, shape, damping)?;

        Ok(trace.readout(&self.readout_indices, discard_steps))
    }

    /// Weights of the bias and input neurons
    #[inline(always)]
    pub fn input_weights(&self) -> &DMatrix<f64> {
        &self.input_weights
    }

    /// Recurrent weights between reservoir neurons
    #[inline(always)]
    pub fn reservoir_weights(&self) -> &DMatrix<f64> {
        &self.reservoir_weights
    }

    /// Rows of the state trace that make up the output columns
    #[inline(always)]
    pub fn readout_indices(&self) -> &[usize] {
        &self.readout_indices
    }

    /// The number of features the weights were drawn for
    #[inline(always)]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// The number of neurons in the reservoir
    #[inline(always)]
    pub fn n_components(&self) -> usize {
        self.reservoir_weights.nrows()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::UniformConstructor;

    use super::*;

    /// Hands out fixed matrices, to steer the recurrence into corner cases
    struct FixedConstructor {
        reservoir_weights: DMatrix<f64>,
        input_weights: DMatrix<f64>,
    }

    impl ReservoirConstructor for FixedConstructor {
        fn construct_reservoir_weights(&mut self, _n_components: usize) -> DMatrix<f64> {
            self.reservoir_weights.clone()
        }

        fn construct_input_weight_matrix(
            &mut self,
            _n_components: usize,
            _n_inputs: usize,
        ) -> DMatrix<f64> {
            self.input_weights.clone()
        }

        fn construct_readout_candidates(&mut self, neurons: std::ops::Range<usize>) -> Vec<usize> {
            neurons.rev().collect()
        }
    }

    #[test]
    fn readout_indices_distinct_and_in_range() {
        let _ = pretty_env_logger::try_init();

        for (n_features, n_components, n_readout) in [(1, 1, 1), (1, 3, 2), (4, 50, 50), (7, 30, 5)]
        {
            let params = Params {
                n_components,
                seed: Some(0),
                ..Params::new(n_readout)
            };
            let mut constructor = UniformConstructor::new(params.seed);
            let weights =
                ReservoirWeights::initialize(&params, n_features, &mut constructor).unwrap();

            let idx = weights.readout_indices();
            assert_eq!(idx.len(), n_readout);
            assert_eq!(idx.iter().collect::<HashSet<_>>().len(), n_readout);
            assert!(idx
                .iter()
                .all(|i| (1 + n_features..1 + n_features + n_components).contains(i)));
        }
    }

    #[test]
    fn readout_indices_keep_permutation_order() {
        let params = Params {
            n_components: 4,
            ..Params::new(3)
        };
        let mut constructor = FixedConstructor {
            reservoir_weights: DMatrix::identity(4, 4),
            input_weights: DMatrix::zeros(4, 3),
        };
        let weights = ReservoirWeights::initialize(&params, 2, &mut constructor).unwrap();

        assert_eq!(weights.readout_indices(), &[6, 5, 4]);
    }

    #[test]
    fn reservoir_weights_scaled_to_spectral_radius() {
        let _ = pretty_env_logger::try_init();

        for weight_scaling in [0.5, 0.9, 1.25] {
            let params = Params {
                n_components: 50,
                weight_scaling,
                seed: Some(7),
                ..Params::new(10)
            };
            let mut constructor = UniformConstructor::new(params.seed);
            let weights = ReservoirWeights::initialize(&params, 3, &mut constructor).unwrap();

            let measured = spectral_radius(weights.reservoir_weights()).unwrap();
            assert!(
                ((measured - weight_scaling) / weight_scaling).abs() < 1e-6,
                "measured: {}, target: {}",
                measured,
                weight_scaling
            );
            assert_eq!(weights.input_weights().shape(), (50, 4));
            assert!(weights.input_weights().iter().all(|w| (-0.5..0.5).contains(w)));
        }
    }

    #[test]
    fn initialize_rejects_degenerate_reservoir() {
        let params = Params {
            n_components: 3,
            ..Params::new(2)
        };
        let nilpotent = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0]);

        for reservoir_weights in [DMatrix::zeros(3, 3), nilpotent] {
            let mut constructor = FixedConstructor {
                reservoir_weights,
                input_weights: DMatrix::zeros(3, 2),
            };

            match ReservoirWeights::initialize(&params, 1, &mut constructor) {
                Err(EsnError::Numerical(msg)) => {
                    assert!(msg.starts_with("cannot scale reservoir weights"), "{}", msg)
                }
                other => panic!("expected a degenerate spectral radius, got {:?}", other),
            }
        }
    }

    /// Logs every call, to pin down the order the random draws are consumed in
    #[derive(Default)]
    struct RecordingConstructor {
        calls: Vec<&'static str>,
    }

    impl ReservoirConstructor for RecordingConstructor {
        fn construct_reservoir_weights(&mut self, n_components: usize) -> DMatrix<f64> {
            self.calls.push("reservoir");
            DMatrix::identity(n_components, n_components)
        }

        fn construct_input_weight_matrix(
            &mut self,
            n_components: usize,
            n_inputs: usize,
        ) -> DMatrix<f64> {
            self.calls.push("input");
            DMatrix::zeros(n_components, n_inputs)
        }

        fn construct_readout_candidates(&mut self, neurons: std::ops::Range<usize>) -> Vec<usize> {
            self.calls.push("readout");
            neurons.collect()
        }
    }

    #[test]
    fn initialize_draw_order() {
        let params = Params {
            n_components: 4,
            ..Params::new(2)
        };
        let mut constructor = RecordingConstructor::default();

        ReservoirWeights::initialize(&params, 1, &mut constructor).unwrap();
        ReservoirWeights::initialize(&params, 3, &mut constructor).unwrap();

        assert_eq!(
            constructor.calls,
            vec!["reservoir", "input", "readout", "reservoir", "input", "readout"]
        );
    }

    #[test]
    fn uniform_constructor_seed_zero_fixture() {
        let params = Params {
            n_components: 3,
            seed: Some(0),
            ..Params::new(2)
        };
        let mut constructor = UniformConstructor::new(params.seed);
        let weights = ReservoirWeights::initialize(&params, 1, &mut constructor).unwrap();

        // input weights are drawn right after the 9 recurrent weights, column by column
        let input_weights = DMatrix::from_row_slice(
            3,
            2,
            &[
                0.10181521859523335,
                0.37414369246265955,
                -0.4030073264465016,
                0.36739020558323465,
                0.3062452166613069,
                -0.27477032438133986,
            ],
        );
        assert!((weights.input_weights() - input_weights).amax() < 1e-15);
        assert_eq!(weights.readout_indices(), &[3, 2]);

        // unscaled spectral radius 0.3862322149737426, real eigenvalues
        let reservoir_weights = DMatrix::from_row_slice(
            3,
            3,
            &[
                -1.009341533362436,
                -0.0660982612731737,
                0.8927480849650482,
                0.7160944106806073,
                -0.036400901846838266,
                -0.7861269852867544,
                -0.27323732950199053,
                0.06747078854318711,
                1.0638777049283448,
            ],
        );
        assert!((weights.reservoir_weights() - reservoir_weights).amax() < 1e-9);
    }

    #[test]
    fn initialize_rejects_too_many_readouts() {
        let params = Params {
            n_components: 3,
            ..Params::new(4)
        };
        let mut constructor = UniformConstructor::new(Some(0));

        assert!(matches!(
            ReservoirWeights::initialize(&params, 1, &mut constructor),
            Err(EsnError::Configuration(_))
        ));
    }

    #[test]
    fn propagate_memoryless_two_steps() {
        let params = Params {
            n_components: 2,
            weight_scaling: 0.5,
            ..Params::new(2)
        };
        // spectral radius of diag(1, -1) is 1, scaled down to 0.5
        let mut constructor = FixedConstructor {
            reservoir_weights: DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]),
            input_weights: DMatrix::from_row_slice(2, 2, &[0.1, 0.2, -0.3, 0.4]),
        };
        let weights = ReservoirWeights::initialize(&params, 1, &mut constructor).unwrap();
        let inputs = DMatrix::from_row_slice(2, 1, &[0.5, -1.0]);

        let trace = weights.propagate(&inputs.rows(0, 2), 1.0).unwrap();

        let a0 = [(0.1f64 + 0.2 * 0.5).tanh(), (-0.3f64 + 0.4 * 0.5).tanh()];
        let a1 = [(0.1 - 0.2 + 0.5 * a0[0]).tanh(), (-0.3 - 0.4 - 0.5 * a0[1]).tanh()];
        let expected = DMatrix::from_row_slice(
            4,
            2,
            &[1.0, 1.0, 0.5, -1.0, a0[0], a1[0], a0[1], a1[1]],
        );
        assert!((trace.components() - expected).amax() < 1e-12);
    }

    #[test]
    fn propagate_frozen_state() {
        let params = Params {
            n_components: 20,
            seed: Some(3),
            ..Params::new(5)
        };
        let mut constructor = UniformConstructor::new(params.seed);
        let weights = ReservoirWeights::initialize(&params, 2, &mut constructor).unwrap();
        let inputs = DMatrix::from_fn(30, 2, |i, j| ((i + j) as f64 * 0.3).sin());

        let trace = weights.propagate(&inputs.rows(0, 30), 0.0).unwrap();

        assert!(trace.activations().iter().all(|a| *a == 0.0));
        assert!(trace.augmented_inputs().row(0).iter().all(|b| *b == 1.0));
    }

    #[test]
    fn propagate_dimension_mismatch() {
        let params = Params {
            n_components: 5,
            seed: Some(0),
            ..Params::new(2)
        };
        let mut constructor = UniformConstructor::new(params.seed);
        let weights = ReservoirWeights::initialize(&params, 2, &mut constructor).unwrap();
        let inputs = DMatrix::from_element(4, 3, 0.1);

        assert_eq!(
            weights.propagate(&inputs.rows(0, 4), 0.5),
            Err(EsnError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn propagate_rejects_damping_out_of_range() {
        let params = Params {
            n_components: 5,
            seed: Some(0),
            ..Params::new(2)
        };
        let mut constructor = UniformConstructor::new(params.seed);
        let weights = ReservoirWeights::initialize(&params, 1, &mut constructor).unwrap();
        let inputs = DMatrix::from_element(4, 1, 0.1);

        for damping in [-0.5, 1.5, f64::NAN] {
            assert!(matches!(
                weights.propagate(&inputs.rows(0, 4), damping),
                Err(EsnError::Configuration(_))
            ));
            assert!(matches!(
                weights.echo(&inputs.rows(0, 4), damping, 0),
                Err(EsnError::Configuration(_))
            ));
        }
        assert!(weights.echo(&inputs.rows(0, 4), 1.0, 0).is_ok());
    }

    #[test]
    fn propagate_detects_instability() {
        let params = Params {
            n_components: 1,
            ..Params::new(1)
        };
        // opposing input weights overflow to inf - inf
        let mut constructor = FixedConstructor {
            reservoir_weights: DMatrix::from_element(1, 1, 1.0),
            input_weights: DMatrix::from_row_slice(1, 3, &[0.0, 1e308, -1e308]),
        };
        let weights = ReservoirWeights::initialize(&params, 2, &mut constructor).unwrap();
        let inputs = DMatrix::from_row_slice(1, 2, &[1e308, 1e308]);

        assert!(matches!(weights.propagate(&inputs.rows(0, 1), 0.5), Err(EsnError::Numerical(_))));
    }
}
