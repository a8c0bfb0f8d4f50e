//! Preconditioned conjugate gradients on vector fields.
//!
//! Solves `A x = b` from the iterate passed in, stopping once the residual
//! norm drops below `small · |b|` (or `small · |r₀|` when `b = 0`, as for the
//! homogeneous shift system) or after `max_iters` iterations. The residual is
//! recomputed from scratch every [`RESIDUAL_REFRESH`] iterations to limit
//! round-off drift. Reaching the cap is not an error; the caller receives the
//! last iterate and a [`CgInfo`] describing how far it got.
use super::LinearOperator;
use crate::field::VectorField3;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const RESIDUAL_REFRESH: usize = 50;

#[derive(Clone, Copy, Debug)]
pub struct CgSolver {
    /// Relative residual reduction that counts as converged.
    pub small: f32,
    pub max_iters: usize,
}

/// Outcome of one CG solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CgInfo {
    pub iterations: usize,
    pub initial_residual: f64,
    pub final_residual: f64,
    pub converged: bool,
}

impl CgSolver {
    pub fn new(small: f32, max_iters: usize) -> Self {
        Self { small, max_iters }
    }

    /// Refine `x` in place towards `A x = b` with preconditioner `m`.
    pub fn solve<A, M>(&self, a: &A, m: &M, b: &VectorField3, x: &mut VectorField3) -> CgInfo
    where
        A: LinearOperator + ?Sized,
        M: LinearOperator + ?Sized,
    {
        let shape = x.shape();
        assert_eq!(shape, b.shape(), "cg: b and x grids differ");

        let mut q = VectorField3::new(shape);
        a.apply(x, &mut q);
        let mut r = b.clone();
        r.axpy(-1.0, &q);
        let mut s = VectorField3::new(shape);
        m.apply(&r, &mut s);
        let mut d = s.clone();
        let mut delta = r.dot(&s);

        let bnorm = b.norm2();
        let rnorm_begin = r.norm2();
        let reference = if bnorm > 0.0 { bnorm } else { rnorm_begin };
        let rnorm_small = self.small as f64 * reference;
        let mut rnorm = rnorm_begin;

        let mut iterations = 0;
        while iterations < self.max_iters && rnorm > rnorm_small {
            if delta <= 0.0 {
                debug!("cg: preconditioned residual vanished at iter={iterations}");
                break;
            }
            a.apply(&d, &mut q);
            let dq = d.dot(&q);
            if dq <= 0.0 {
                debug!("cg: non-positive curvature dq={dq:.3e} at iter={iterations}");
                break;
            }
            let alpha = delta / dq;
            x.axpy(alpha as f32, &d);
            iterations += 1;

            if iterations % RESIDUAL_REFRESH == 0 {
                a.apply(x, &mut q);
                r.copy_from(b);
                r.axpy(-1.0, &q);
            } else {
                r.axpy(-(alpha as f32), &q);
            }

            m.apply(&r, &mut s);
            let delta_old = delta;
            delta = r.dot(&s);
            let beta = delta / delta_old;
            d.scale_add(beta as f32, &s);
            rnorm = r.norm2();
        }

        let converged = rnorm <= rnorm_small;
        if converged {
            debug!(
                "cg: converged iters={} residual {:.3e} -> {:.3e}",
                iterations, rnorm_begin, rnorm
            );
        } else {
            warn!(
                "cg: stopped without convergence iters={} residual {:.3e} -> {:.3e} (target {:.3e})",
                iterations, rnorm_begin, rnorm, rnorm_small
            );
        }
        CgInfo {
            iterations,
            initial_residual: rnorm_begin,
            final_residual: rnorm,
            converged,
        }
    }
}
