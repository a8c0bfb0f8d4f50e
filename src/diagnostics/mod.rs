//! Diagnostics returned next to the estimated shifts.
//!
//! [`ShiftReport`] records what the estimator saw and did: grid size,
//! constraint and fault counts, the CG outcome and per-stage timings. It
//! serializes to JSON for offline inspection.

pub mod report;
pub mod timing;

pub use report::{ShiftReport, ShiftResult};
pub use timing::{StageTiming, TimingBreakdown};
