//! Parameters of the shift estimation and the final warp.
//!
//! Defaults follow common practice for seismic volumes: smoothing half-widths
//! of six samples, a 1% residual reduction for CG with at most 100 iterations,
//! and 40 fixed-point iterations for the Eulerian → Lagrangian conversion.

use crate::sinc::SincParams;
use serde::{Deserialize, Serialize};

/// Knobs for [`ShiftEstimator`](crate::ShiftEstimator) and
/// [`ImageWarper`](crate::ImageWarper).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnfaultParams {
    /// Preconditioner half-width along the first dimension.
    pub sigma1: f32,
    /// Preconditioner half-width along the second and third dimensions.
    pub sigma2: f32,
    /// CG stops once the residual drops below `small` times its start value.
    pub small: f32,
    /// Maximum number of CG iterations.
    pub inner_iters: usize,
    /// Fixed-point iterations converting Eulerian to Lagrangian shifts.
    pub convert_iters: usize,
    /// Interpolation kernel used when warping images.
    pub sinc: SincParams,
}

impl Default for UnfaultParams {
    fn default() -> Self {
        Self {
            sigma1: 6.0,
            sigma2: 6.0,
            small: 0.01,
            inner_iters: 100,
            convert_iters: 40,
            sinc: SincParams::default(),
        }
    }
}

impl UnfaultParams {
    pub fn new(sigma1: f32, sigma2: f32) -> Self {
        Self {
            sigma1,
            sigma2,
            ..Default::default()
        }
    }

    pub fn with_inner_iters(mut self, inner_iters: usize) -> Self {
        self.inner_iters = inner_iters;
        self
    }

    pub fn with_small(mut self, small: f32) -> Self {
        self.small = small;
        self
    }

    pub fn with_convert_iters(mut self, convert_iters: usize) -> Self {
        self.convert_iters = convert_iters;
        self
    }

    pub fn with_sinc(mut self, sinc: SincParams) -> Self {
        self.sinc = sinc;
        self
    }
}
