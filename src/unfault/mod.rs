//! Unfaulting workflow built on the solver, smoothing and interpolation
//! layers.
//!
//! Modules
//! - [`estimator`] – [`ShiftEstimator`], seeding and the constrained solve.
//! - [`cleanup`] – copying off-fault shifts onto fault samples.
//! - [`convert`] – Eulerian → Lagrangian fixed-point conversion.
//! - [`warp`] – [`ImageWarper`], sinc resampling of images.
//! - [`params`] – [`UnfaultParams`].
pub mod cleanup;
pub mod convert;
pub mod estimator;
pub mod params;
pub mod warp;

pub use cleanup::{fill_fault_gaps, FilledShifts};
pub use convert::convert_shifts;
pub use estimator::ShiftEstimator;
pub use params::UnfaultParams;
pub use warp::ImageWarper;

use crate::constraints::ConstraintError;
use crate::field::ShapeMismatch;

/// Inputs rejected before any computation starts.
#[derive(Clone, Debug, PartialEq)]
pub enum UnfaultError {
    Shape(ShapeMismatch),
    Constraint(ConstraintError),
}

impl std::fmt::Display for UnfaultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnfaultError::Shape(err) => write!(f, "shape mismatch: {err}"),
            UnfaultError::Constraint(err) => write!(f, "invalid constraint: {err}"),
        }
    }
}

impl std::error::Error for UnfaultError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UnfaultError::Shape(err) => Some(err),
            UnfaultError::Constraint(err) => Some(err),
        }
    }
}

impl From<ShapeMismatch> for UnfaultError {
    fn from(err: ShapeMismatch) -> Self {
        UnfaultError::Shape(err)
    }
}

impl From<ConstraintError> for UnfaultError {
    fn from(err: ConstraintError) -> Self {
        UnfaultError::Constraint(err)
    }
}
