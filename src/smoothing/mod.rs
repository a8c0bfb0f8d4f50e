//! Weighted separable smoothing of 3D fields.
//!
//! The preconditioner only needs "something Gaussian-like that respects a
//! weight field", so the filter is hidden behind [`Smoother`]. The provided
//! [`LocalSmoother`] solves a small diffusion system per grid line.
pub mod local;

pub use local::LocalSmoother;

use crate::field::{ScalarField3, VectorField3};

/// Separable smoothing respecting per-sample weights.
pub trait Smoother: Sync {
    /// Smooth `field` in place with half-widths `sigma1` (first dimension),
    /// `sigma2a` (second) and `sigma2b` (third). `weights = None` means unit
    /// weights everywhere.
    fn smooth(
        &self,
        sigma1: f32,
        sigma2a: f32,
        sigma2b: f32,
        weights: Option<&ScalarField3>,
        field: &mut ScalarField3,
    );

    /// Apply [`Smoother::smooth`] to every component of `field`.
    fn smooth_vector(
        &self,
        sigma1: f32,
        sigma2a: f32,
        sigma2b: f32,
        weights: Option<&ScalarField3>,
        field: &mut VectorField3,
    ) {
        for c in field.components_mut() {
            self.smooth(sigma1, sigma2a, sigma2b, weights, c);
        }
    }
}
