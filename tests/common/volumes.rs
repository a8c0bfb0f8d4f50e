use nalgebra::Vector3;
use unfault::{ConstraintPair, ConstraintSet, ScalarField3, Shape3};

/// Unit weights everywhere.
pub fn unit_mask(shape: Shape3) -> ScalarField3 {
    ScalarField3::filled(shape, 1.0)
}

/// Unit weights except for a fault plane at `i1 == fault_i1`.
pub fn plane_fault_mask(shape: Shape3, fault_i1: usize) -> ScalarField3 {
    assert!(fault_i1 < shape.n1, "fault plane outside the grid");
    ScalarField3::from_fn(shape, |i1, _, _| if i1 == fault_i1 { 0.0 } else { 1.0 })
}

/// Horizontally layered image: reflectivity varies along the first axis only.
pub fn layered_image(shape: Shape3) -> ScalarField3 {
    ScalarField3::from_fn(shape, |i1, _, _| {
        let t = i1 as f32;
        (0.4 * t).sin() + 0.5 * (0.15 * t).cos()
    })
}

pub fn single_pair(shape: Shape3, a: [usize; 3], b: [usize; 3], slip: Vector3<f32>) -> ConstraintSet {
    ConstraintSet::from_pairs(shape, [ConstraintPair::new(a, b, slip)])
        .expect("constraint inside the grid")
}
