//! Constrained smoother used as the CG preconditioner.
//!
//! `M x = P S P x` where `P` averages the values at both ends of every
//! constraint pair and `S` is the weighted smoothing filter. `P` is an
//! orthogonal projection and `S` is symmetric positive definite, so `M` is
//! symmetric positive semi-definite as CG requires.
//!
//! `M` only ever sees residuals, so its output is the search direction. Every
//! direction therefore has equal values at both ends of each pair and the
//! difference `2·s` seeded into the iterate survives all updates.
use super::LinearOperator;
use crate::constraints::ConstraintSet;
use crate::field::{ScalarField3, VectorField3};
use crate::smoothing::Smoother;

pub struct ConstrainedSmoother<'a, S: Smoother + ?Sized> {
    constraints: &'a ConstraintSet,
    smoother: &'a S,
    sigma1: f32,
    sigma2: f32,
    weights: Option<&'a ScalarField3>,
}

impl<'a, S: Smoother + ?Sized> ConstrainedSmoother<'a, S> {
    /// `sigma1` is the half-width along the first dimension, `sigma2` along
    /// the second and third.
    pub fn new(
        constraints: &'a ConstraintSet,
        smoother: &'a S,
        sigma1: f32,
        sigma2: f32,
        weights: Option<&'a ScalarField3>,
    ) -> Self {
        Self {
            constraints,
            smoother,
            sigma1,
            sigma2,
            weights,
        }
    }
}

impl<S: Smoother + ?Sized> LinearOperator for ConstrainedSmoother<'_, S> {
    fn apply(&self, x: &VectorField3, y: &mut VectorField3) {
        y.copy_from(x);
        self.constraints.project_vector(y);
        self.smoother
            .smooth_vector(self.sigma1, self.sigma2, self.sigma2, self.weights, y);
        self.constraints.project_vector(y);
    }
}
