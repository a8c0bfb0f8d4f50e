//! Shift estimation driver: seed, constrained CG solve, gap fill, conversion.
use super::cleanup::fill_fault_gaps;
use super::convert::convert_shifts;
use super::params::UnfaultParams;
use super::UnfaultError;
use crate::constraints::ConstraintSet;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{ShiftReport, ShiftResult, TimingBreakdown};
use crate::field::{ScalarField3, VectorField3};
use crate::smoothing::{LocalSmoother, Smoother};
use crate::solver::{CgInfo, CgSolver, ConstrainedSmoother, StiffnessOperator};
use crate::tensors::TensorField;
use log::debug;
use std::time::Instant;

static DEFAULT_SMOOTHER: LocalSmoother = LocalSmoother;

/// Estimates Lagrangian unfaulting shifts from slip constraints.
///
/// Holds only borrowed collaborators and parameters; every call allocates
/// its own fields.
pub struct ShiftEstimator<'a> {
    params: UnfaultParams,
    tensors: Option<&'a dyn TensorField>,
    smoother: &'a dyn Smoother,
}

impl Default for ShiftEstimator<'_> {
    fn default() -> Self {
        Self::new(UnfaultParams::default())
    }
}

impl<'a> ShiftEstimator<'a> {
    pub fn new(params: UnfaultParams) -> Self {
        Self {
            params,
            tensors: None,
            smoother: &DEFAULT_SMOOTHER,
        }
    }

    /// Steer the regularization with `tensors`; without them the stiffness
    /// operator is isotropic.
    pub fn with_tensors(mut self, tensors: &'a dyn TensorField) -> Self {
        self.tensors = Some(tensors);
        self
    }

    pub fn with_smoother(mut self, smoother: &'a dyn Smoother) -> Self {
        self.smoother = smoother;
        self
    }

    pub fn with_inner_iters(mut self, inner_iters: usize) -> Self {
        self.params.inner_iters = inner_iters;
        self
    }

    pub fn params(&self) -> &UnfaultParams {
        &self.params
    }

    /// Lagrangian shifts for `sp`, with `wp` zero on faults and `ws` the
    /// smoothing weights (unit weights when `None`).
    pub fn find_shifts(
        &self,
        sp: &ConstraintSet,
        wp: &ScalarField3,
        ws: Option<&ScalarField3>,
    ) -> Result<VectorField3, UnfaultError> {
        self.find_shifts_with_diagnostics(sp, wp, ws)
            .map(|result| result.shifts)
    }

    /// Same as [`find_shifts`](Self::find_shifts) plus a [`ShiftReport`].
    pub fn find_shifts_with_diagnostics(
        &self,
        sp: &ConstraintSet,
        wp: &ScalarField3,
        ws: Option<&ScalarField3>,
    ) -> Result<ShiftResult, UnfaultError> {
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();

        let solve_start = Instant::now();
        let (solved, cg) = self.solve_shifts(sp, wp, ws)?;
        timings.push("solve", elapsed_ms(solve_start));

        let filled = timings.record("fill_fault_gaps", || fill_fault_gaps(wp, &solved));
        debug!(
            "ShiftEstimator: filled {} fault samples from off-fault neighbours",
            filled.filled
        );

        let convert_iters = self.params.convert_iters;
        let shifts = timings.record("convert_shifts", || {
            convert_shifts(convert_iters, &filled.shifts)
        });
        timings.total_ms = elapsed_ms(total_start);
        debug!(
            "ShiftEstimator: done in {:.1} ms (max |u| = {:.3})",
            timings.total_ms,
            shifts.max_abs()
        );

        let fault_points = wp.as_slice().iter().filter(|&&w| w == 0.0).count();
        let report = ShiftReport {
            shape: wp.shape(),
            constraints: sp.len(),
            fault_points,
            filled_points: filled.filled,
            cg,
            convert_iters,
            timings,
        };
        Ok(ShiftResult { shifts, report })
    }

    /// Seed and run the constrained CG solve only. The returned field is in
    /// Eulerian form and still holds raw values on fault samples.
    pub fn solve_shifts(
        &self,
        sp: &ConstraintSet,
        wp: &ScalarField3,
        ws: Option<&ScalarField3>,
    ) -> Result<(VectorField3, CgInfo), UnfaultError> {
        let shape = wp.shape();
        shape.check(sp.shape(), "constraint set")?;
        if let Some(ws) = ws {
            shape.check(ws.shape(), "smoothing weights ws")?;
        }
        if let Some(found) = self.tensors.and_then(|t| t.shape()) {
            shape.check(found, "tensor field")?;
        }
        debug!(
            "ShiftEstimator: grid {} with {} constraint pairs, sigma=({}, {})",
            shape,
            sp.len(),
            self.params.sigma1,
            self.params.sigma2
        );

        let mut r = sp.seed();
        let b = VectorField3::new(shape);
        let a = StiffnessOperator::new(self.tensors, Some(wp));
        let m = ConstrainedSmoother::new(
            sp,
            self.smoother,
            self.params.sigma1,
            self.params.sigma2,
            ws,
        );
        let cg = CgSolver::new(self.params.small, self.params.inner_iters).solve(&a, &m, &b, &mut r);
        debug!(
            "ShiftEstimator: cg {} iterations, residual {:.3e} -> {:.3e}",
            cg.iterations, cg.initial_residual, cg.final_residual
        );
        Ok((r, cg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintPair;
    use crate::field::Shape3;
    use crate::tensors::DenseTensors;
    use nalgebra::Vector3;

    fn single_pair(shape: Shape3) -> ConstraintSet {
        ConstraintSet::from_pairs(
            shape,
            [ConstraintPair::new([2, 4, 3], [6, 4, 3], Vector3::new(1.0, 0.5, 0.0))],
        )
        .unwrap()
    }

    #[test]
    fn empty_constraints_give_zero_shifts() {
        let shape = Shape3::new(6, 5, 4);
        let wp = ScalarField3::filled(shape, 1.0);
        let sp = ConstraintSet::new(shape);
        let result = ShiftEstimator::default()
            .find_shifts_with_diagnostics(&sp, &wp, None)
            .unwrap();
        assert_eq!(result.shifts, VectorField3::new(shape));
        assert_eq!(result.report.cg.iterations, 0);
        assert_eq!(result.report.constraints, 0);
    }

    #[test]
    fn solve_keeps_the_seeded_difference() {
        let shape = Shape3::new(9, 9, 7);
        let wp = ScalarField3::filled(shape, 1.0);
        let sp = single_pair(shape);
        let estimator = ShiftEstimator::new(UnfaultParams::new(2.0, 2.0));
        let (r, _) = estimator.solve_shifts(&sp, &wp, None).unwrap();
        let diff = r.get(2, 4, 3) - r.get(6, 4, 3);
        assert!((diff.x - 2.0).abs() < 1e-4, "diff {diff:?}");
        assert!((diff.y - 1.0).abs() < 1e-4, "diff {diff:?}");
        assert!(diff.z.abs() < 1e-4, "diff {diff:?}");
    }

    #[test]
    fn mismatched_inputs_are_rejected_before_solving() {
        let shape = Shape3::new(5, 5, 5);
        let wp = ScalarField3::filled(shape, 1.0);
        let ws = ScalarField3::filled(Shape3::new(5, 5, 4), 1.0);
        let sp = ConstraintSet::new(shape);
        let err = ShiftEstimator::default()
            .find_shifts(&sp, &wp, Some(&ws))
            .unwrap_err();
        assert!(matches!(err, UnfaultError::Shape(m) if m.what == "smoothing weights ws"));

        let tensors = DenseTensors::identity(Shape3::new(4, 5, 5));
        let err = ShiftEstimator::default()
            .with_tensors(&tensors)
            .find_shifts(&sp, &wp, None)
            .unwrap_err();
        assert!(matches!(err, UnfaultError::Shape(m) if m.what == "tensor field"));
    }

    #[test]
    fn report_counts_fault_samples_and_stages() {
        let shape = Shape3::new(9, 9, 7);
        let wp = ScalarField3::from_fn(shape, |i1, _, _| if i1 == 4 { 0.0 } else { 1.0 });
        let sp = single_pair(shape);
        let result = ShiftEstimator::new(UnfaultParams::new(2.0, 2.0))
            .with_inner_iters(20)
            .find_shifts_with_diagnostics(&sp, &wp, None)
            .unwrap();
        let report = &result.report;
        assert_eq!(report.fault_points, 9 * 7);
        assert_eq!(report.filled_points, 9 * 7);
        assert!(report.cg.iterations <= 20);
        for stage in ["solve", "fill_fault_gaps", "convert_shifts"] {
            assert!(report.timings.stage_ms(stage).is_some(), "missing stage {stage}");
        }
        let json = report.to_json().unwrap();
        assert!(json.contains("\"faultPoints\""));
    }
}
