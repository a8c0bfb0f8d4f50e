//! Dense 3D fields sampled on a regular grid.
//!
//! Every field is stored as a single contiguous `Vec<f32>` with the first
//! dimension varying fastest: sample `(i1, i2, i3)` lives at
//! `i1 + n1 * (i2 + n2 * i3)`. A slice `i3` (all samples sharing the slowest
//! index) is therefore a contiguous run of `n1 * n2` values, which is the unit
//! of work for the parallel loops in the solver and the warper.
//!
//! - [`Shape3`] describes the grid and converts indices.
//! - [`ScalarField3`] holds one value per grid point (masks, images).
//! - [`VectorField3`] holds three co-indexed scalar components (shifts).
pub mod scalar;
pub mod shape;
pub mod vector;

pub use self::scalar::ScalarField3;
pub use self::shape::{Shape3, ShapeMismatch};
pub use self::vector::VectorField3;
