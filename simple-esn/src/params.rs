use crate::EsnError;

/// The parameters of the Echo State Network
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Number of readout neurons, chosen randomly in the reservoir.
    /// Determines the dimension of the output.
    pub n_readout: usize,

    /// Number of nodes in the reservoir
    pub n_components: usize,

    /// Tunes the decay time of internal activity of the network.
    /// Each step the new activation is `(1 - damping) * previous + damping * tanh(..)`,
    /// so 1 keeps no leaky memory at all while values close to 0 nearly freeze the state.
    /// Must lie in [0, 1].
    pub damping: f64,

    /// The spectral radius the reservoir weights are scaled to.
    /// It determines how fast the influence of an input dies out in the
    /// reservoir with time, and how stable the reservoir activations are.
    /// Classical regimes involve values around 1.
    pub weight_scaling: f64,

    /// Number of initial time steps to drop from the output, to let the
    /// dynamics of the reservoir settle
    pub discard_steps: usize,

    /// Optional seed for Rng, drawn from system entropy otherwise
    pub seed: Option<u64>,
}

impl Params {
    /// Default parameters for the given number of readout neurons
    pub fn new(n_readout: usize) -> Self {
        Self {
            n_readout,
            n_components: 100,
            damping: 0.5,
            weight_scaling: 0.9,
            discard_steps: 0,
            seed: None,
        }
    }

    /// Check the parameters for consistency
    pub fn validate(&self) -> Result<(), EsnError> {
        if self.n_readout == 0 {
            return Err(EsnError::Configuration("n_readout must be at least 1".to_string()));
        }
        if self.n_components == 0 {
            return Err(EsnError::Configuration("n_components must be at least 1".to_string()));
        }
        if self.n_readout > self.n_components {
            return Err(EsnError::Configuration(format!(
                "n_readout ({}) exceeds n_components ({})",
                self.n_readout, self.n_components
            )));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(EsnError::Configuration(format!(
                "damping must lie in [0, 1], got {}",
                self.damping
            )));
        }
        if !self.weight_scaling.is_finite() || self.weight_scaling <= 0.0 {
            return Err(EsnError::Configuration(format!(
                "weight_scaling must be finite and positive, got {}",
                self.weight_scaling
            )));
        }

        Ok(())
    }
}
