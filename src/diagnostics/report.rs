use super::timing::TimingBreakdown;
use crate::field::{Shape3, VectorField3};
use crate::solver::CgInfo;
use serde::Serialize;

/// Result of [`ShiftEstimator::find_shifts_with_diagnostics`](crate::ShiftEstimator).
#[derive(Clone, Debug)]
pub struct ShiftResult {
    /// Lagrangian shifts ready for [`ImageWarper`](crate::ImageWarper).
    pub shifts: VectorField3,
    pub report: ShiftReport,
}

/// Summary of one estimator run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftReport {
    pub shape: Shape3,
    pub constraints: usize,
    /// Samples with `wp == 0`.
    pub fault_points: usize,
    /// Fault samples that received a value from an off-fault neighbour.
    pub filled_points: usize,
    pub cg: CgInfo,
    pub convert_iters: usize,
    pub timings: TimingBreakdown,
}

impl ShiftReport {
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize report: {e}"))
    }
}
