//! Replace shifts on fault samples by their nearest off-fault value.
//!
//! The solve has no stiffness across `wp == 0` samples, so values there are
//! poorly determined. Each such sample copies all three components from the
//! closest sample with `wp != 0` (Euclidean distance on the grid).
use crate::cpt::ClosestPointTransform;
use crate::field::{ScalarField3, VectorField3};

/// Output of [`fill_fault_gaps`].
#[derive(Clone, Debug)]
pub struct FilledShifts {
    pub shifts: VectorField3,
    /// Number of fault samples that received a value.
    pub filled: usize,
}

/// Return a copy of `r` where every `wp == 0` sample holds the value of the
/// nearest `wp != 0` sample. Off-fault samples are copied unchanged; when the
/// mask has no off-fault sample the copy equals `r`.
pub fn fill_fault_gaps(wp: &ScalarField3, r: &VectorField3) -> FilledShifts {
    assert_eq!(wp.shape(), r.shape(), "fault mask and shifts grids differ");
    let mut out = r.clone();
    if !wp.as_slice().iter().any(|&w| w == 0.0) {
        return FilledShifts {
            shifts: out,
            filled: 0,
        };
    }

    let closest = ClosestPointTransform.apply(0.0, wp);
    let mut filled = 0;
    for (idx, &w) in wp.as_slice().iter().enumerate() {
        if w != 0.0 {
            continue;
        }
        let Some(src) = closest.nearest_linear(idx) else {
            continue;
        };
        for (dst, from) in out.components_mut().iter_mut().zip(r.components()) {
            dst.as_mut_slice()[idx] = from.as_slice()[src];
        }
        filled += 1;
    }
    FilledShifts {
        shifts: out,
        filled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Shape3;
    use nalgebra::Vector3;

    fn labelled(shape: Shape3) -> VectorField3 {
        let mut r = VectorField3::new(shape);
        for i3 in 0..shape.n3 {
            for i2 in 0..shape.n2 {
                for i1 in 0..shape.n1 {
                    let v = (i1 + 10 * i2 + 100 * i3) as f32;
                    r.set(i1, i2, i3, Vector3::new(v, -v, 0.5 * v));
                }
            }
        }
        r
    }

    #[test]
    fn off_fault_samples_are_untouched() {
        let shape = Shape3::new(5, 4, 3);
        let wp = ScalarField3::from_fn(shape, |i1, _, _| if i1 == 2 { 0.0 } else { 1.0 });
        let r = labelled(shape);
        let out = fill_fault_gaps(&wp, &r);
        assert_eq!(out.filled, 4 * 3);
        for i3 in 0..3 {
            for i2 in 0..4 {
                for i1 in [0, 1, 3, 4] {
                    assert_eq!(out.shifts.get(i1, i2, i3), r.get(i1, i2, i3));
                }
            }
        }
    }

    #[test]
    fn fault_samples_copy_a_nearest_neighbour() {
        let shape = Shape3::new(6, 3, 3);
        // Two-sample thick fault: i1 = 2 and 3.
        let wp = ScalarField3::from_fn(shape, |i1, _, _| if i1 == 2 || i1 == 3 { 0.0 } else { 1.0 });
        let r = labelled(shape);
        let out = fill_fault_gaps(&wp, &r);
        for i3 in 0..3 {
            for i2 in 0..3 {
                assert_eq!(out.shifts.get(2, i2, i3), r.get(1, i2, i3));
                assert_eq!(out.shifts.get(3, i2, i3), r.get(4, i2, i3));
            }
        }
    }

    #[test]
    fn all_fault_mask_leaves_field_unchanged() {
        let shape = Shape3::new(3, 3, 3);
        let wp = ScalarField3::new(shape);
        let r = labelled(shape);
        let out = fill_fault_gaps(&wp, &r);
        assert_eq!(out.filled, 0);
        assert_eq!(out.shifts, r);
    }
}
