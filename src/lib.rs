#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod constraints;
pub mod diagnostics;
pub mod field;
pub mod unfault;

// Building blocks – public so they can be swapped or reused, but their
// signatures may still move.
pub mod cpt;
pub mod sinc;
pub mod smoothing;
pub mod solver;
pub mod tensors;

// --- High-level re-exports -------------------------------------------------

// Main entry points: estimator, warper and their parameters.
pub use crate::unfault::{ImageWarper, ShiftEstimator, UnfaultError, UnfaultParams};

// Inputs and outputs.
pub use crate::constraints::{ConstraintError, ConstraintPair, ConstraintSet};
pub use crate::field::{ScalarField3, Shape3, ShapeMismatch, VectorField3};

// Diagnostics returned by the estimator.
pub use crate::diagnostics::{ShiftReport, ShiftResult};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use unfault::prelude::*;
/// use nalgebra::Vector3;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let shape = Shape3::new(64, 64, 32);
/// let wp = ScalarField3::from_fn(shape, |_, i2, _| if i2 == 32 { 0.0 } else { 1.0 });
/// let sp = ConstraintSet::from_pairs(
///     shape,
///     [ConstraintPair::new([20, 30, 16], [20, 34, 16], Vector3::new(1.5, 0.0, 0.0))],
/// )?;
///
/// let shifts = ShiftEstimator::new(UnfaultParams::default()).find_shifts(&sp, &wp, None)?;
/// let image = ScalarField3::new(shape);
/// let unfaulted = ImageWarper::default().apply_shifts(&shifts, &image)?;
/// println!("max |u| = {:.3}, samples = {}", shifts.max_abs(), unfaulted.as_slice().len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::{
        ConstraintPair, ConstraintSet, ImageWarper, ScalarField3, Shape3, ShiftEstimator,
        UnfaultParams, VectorField3,
    };
}
