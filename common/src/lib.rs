//! This crate provides common funcionality shared by the reservoir and its readouts

#![deny(unused_imports, unused_crate_dependencies)]
#![warn(missing_docs)]

use nalgebra::{Const, Dyn, MatrixView};

mod validation;

pub use validation::{validate_sequence, ValidationError};

/// A borrowed sequence of observations.
/// Each row is one time step, each column one feature.
pub type SequenceView<'a> = MatrixView<'a, f64, Dyn, Dyn, Const<1>, Dyn>;
