//! A fixed, untrained reservoir of leaky tanh neurons (Echo State Network),
//! mapping an input sequence onto the activations of randomly chosen readout neurons.
//! Fitting a readout on top of these echoes is left to the caller, see the `lin-reg` crate.

#[macro_use]
extern crate log;

use nalgebra::DVector;

mod error;
mod esn;
mod params;
mod reservoir_constructor;
mod spectral;
mod state_trace;
mod weights;

pub use error::EsnError;
pub use esn::EchoStateNetwork;
pub use params::Params;
pub use reservoir_constructor::{ReservoirConstructor, UniformConstructor};
pub use spectral::spectral_radius;
pub use state_trace::StateTrace;
pub use weights::ReservoirWeights;

/// Activation of the reservoir neurons at a single time step
pub type StateMatrix = DVector<f64>;
