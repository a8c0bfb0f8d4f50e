//! Linear system for the shift field and its preconditioned CG solve.
//!
//! Modules
//! - [`stiffness`] – the anisotropic, mask-weighted stiffness operator `A`.
//! - [`precondition`] – the constrained smoother `M` (projection, smoothing,
//!   projection).
//! - [`cg`] – preconditioned conjugate gradients over [`VectorField3`].
//!
//! Both `A` and `M` are plain vector-to-vector maps exposed through
//! [`LinearOperator`], so the driver knows nothing about constraints,
//! tensors or masks.
pub mod cg;
pub mod precondition;
pub mod stiffness;

use crate::field::VectorField3;

pub use cg::{CgInfo, CgSolver};
pub use precondition::ConstrainedSmoother;
pub use stiffness::StiffnessOperator;

/// Linear map between vector fields on one grid.
pub trait LinearOperator {
    /// Overwrite `y` with the operator applied to `x`. `x` is left untouched.
    fn apply(&self, x: &VectorField3, y: &mut VectorField3);
}
