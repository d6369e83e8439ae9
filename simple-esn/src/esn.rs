use common::{validate_sequence, SequenceView};
use nalgebra::DMatrix;

use crate::{EsnError, Params, ReservoirConstructor, ReservoirWeights, UniformConstructor};

/// Whether the weights have been drawn yet
#[derive(Debug, Clone, Default)]
enum Reservoir {
    #[default]
    Uninitialized,
    Initialized(ReservoirWeights),
}

/// Simple Echo State Network.
///
/// Neuron reservoir of tanh units with random recurrent connections.
/// The damping factor ensures echoes in the network. No learning takes place
/// in the reservoir, the readout is left at the user's convenience.
/// Inputs should be normalized to [-1, 1].
///
/// `fit` and `fit_transform` always draw fresh weights from the generator, while
/// `transform` only draws them if there are none yet. To obtain consistent echoes
/// for multiple sequences, `fit` once and then `transform` each sequence.
#[derive(Debug, Clone)]
pub struct EchoStateNetwork<C = UniformConstructor> {
    params: Params,
    constructor: C,
    reservoir: Reservoir,
}

impl EchoStateNetwork<UniformConstructor> {
    /// Create a new reservoir, with weights drawn lazily from a generator seeded by `params.seed`
    pub fn new(params: Params) -> Result<Self, EsnError> {
        let constructor = UniformConstructor::new(params.seed);

        Self::with_constructor(params, constructor)
    }
}

impl<C> EchoStateNetwork<C>
where
    C: ReservoirConstructor,
{
    /// Create a new reservoir drawing its weights from a custom constructor
    pub fn with_constructor(params: Params, constructor: C) -> Result<Self, EsnError> {
        params.validate()?;

        Ok(Self {
            params,
            constructor,
            reservoir: Reservoir::Uninitialized,
        })
    }

    #[inline(always)]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The current weights, if any have been drawn
    pub fn weights(&self) -> Option<&ReservoirWeights> {
        match &self.reservoir {
            Reservoir::Initialized(weights) => Some(weights),
            Reservoir::Uninitialized => None,
        }
    }

    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        matches!(self.reservoir, Reservoir::Initialized(_))
    }

    /// Forget the current weights. The next `transform` draws new ones
    /// from the generator, which is not re-seeded.
    pub fn reset(&mut self) {
        self.reservoir = Reservoir::Uninitialized;
    }

    /// Draw fresh weights for the feature count of `inputs`.
    /// The echoes are computed and discarded, as no learning takes place in the reservoir.
    pub fn fit(&mut self, inputs: &SequenceView) -> Result<&mut Self, EsnError> {
        self.fit_transform(inputs)?;

        Ok(self)
    }

    /// Draw fresh weights for the feature count of `inputs` and generate its echoes
    ///
    /// # Returns:
    /// Activations of the readout neurons, shape (n_samples - discard_steps, n_readout)
    pub fn fit_transform(&mut self, inputs: &SequenceView) -> Result<DMatrix<f64>, EsnError> {
        let shape = validate_sequence(inputs)?;
        let weights = ReservoirWeights::initialize(&self.params, shape.1, &mut self.constructor)?;

        let echoes = self.echo(&weights, inputs, shape);
        self.reservoir = Reservoir::Initialized(weights);

        echoes
    }

    /// Generate the echoes of `inputs`, reusing the existing weights.
    /// Weights are only drawn if there are none yet.
    ///
    /// # Returns:
    /// Activations of the readout neurons, shape (n_samples - discard_steps, n_readout)
    pub fn transform(&mut self, inputs: &SequenceView) -> Result<DMatrix<f64>, EsnError> {
        let shape = validate_sequence(inputs)?;
        let n_features = shape.1;
        let weights = match std::mem::take(&mut self.reservoir) {
            Reservoir::Initialized(weights) => weights,
            Reservoir::Uninitialized => {
                debug!("drawing reservoir weights for {} features on first use", n_features);
                ReservoirWeights::initialize(&self.params, n_features, &mut self.constructor)?
            }
        };

        let echoes = self.echo(&weights, inputs, shape);
        self.reservoir = Reservoir::Initialized(weights);

        echoes
    }

    #[inline]
    fn echo(
        &self,
        weights: &ReservoirWeights,
        inputs: &SequenceView,
        shape: (usize, usize),
    ) -> Result<DMatrix<f64>, EsnError> {
        weights.echo_validated(inputs, shape, self.params.damping, self.params.discard_steps)
    }
}
