//! Anisotropic stiffness operator on a 3-component field.
//!
//! For every unit cell `(i1, i2, i3)` with all indices ≥ 1 the eight corners
//! `{i-1, i}³` give four diagonal differences `a, b, c, d` per component:
//!
//! ```text
//! a = x[i3  ][i2  ][i1] - x[i3-1][i2-1][i1-1]
//! b = x[i3  ][i2-1][i1] - x[i3-1][i2  ][i1-1]
//! c = x[i3-1][i2  ][i1] - x[i3  ][i2-1][i1-1]
//! d = x[i3-1][i2-1][i1] - x[i3  ][i2  ][i1-1]
//! ```
//!
//! from which the cell-centred gradient is `g = ¼ (a+b+c+d, a-b+c-d, a+b-c-d)`.
//! The gradient is weighted by `wp²`, multiplied by the local tensor `D` and
//! scattered back to the corners with the transposed pattern, i.e. the
//! operator is `Gᵀ D W G` (symmetric, positive semi-definite for PSD `D`).
//! The three components share tensors and mask but never mix.
//!
//! The scatter for cell `i3` writes slices `i3 - 1` and `i3`. Cells are
//! therefore processed in two phases: odd `i3` (slice pairs `(0,1)`, `(2,3)`,
//! …) and then even `i3` (pairs `(1,2)`, `(3,4)`, …). Within a phase every
//! task owns its pair of output slices exclusively.
use super::LinearOperator;
use crate::field::{ScalarField3, Shape3, VectorField3};
use crate::tensors::TensorField;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 1.0];

/// `A = Gᵀ D wp² G` applied per component.
#[derive(Clone, Copy)]
pub struct StiffnessOperator<'a> {
    tensors: Option<&'a dyn TensorField>,
    wp: Option<&'a ScalarField3>,
}

impl<'a> StiffnessOperator<'a> {
    /// `None` tensors mean identity, `None` mask means unit weights.
    pub fn new(tensors: Option<&'a dyn TensorField>, wp: Option<&'a ScalarField3>) -> Self {
        Self { tensors, wp }
    }

    fn scatter_phase(&self, x: &VectorField3, y: &mut VectorField3, first: usize) {
        let shape = x.shape();
        let len = shape.slice_len();
        let offset = (first - 1) * len;
        let [y1, y2, y3] = y.components_mut();
        let (y1, y2, y3) = (
            &mut y1.as_mut_slice()[offset..],
            &mut y2.as_mut_slice()[offset..],
            &mut y3.as_mut_slice()[offset..],
        );

        #[cfg(feature = "parallel")]
        y1.par_chunks_mut(2 * len)
            .zip(y2.par_chunks_mut(2 * len))
            .zip(y3.par_chunks_mut(2 * len))
            .enumerate()
            .for_each(|(k, ((c1, c2), c3))| {
                self.scatter_pair(first + 2 * k, shape, x, [c1, c2, c3]);
            });

        #[cfg(not(feature = "parallel"))]
        y1.chunks_mut(2 * len)
            .zip(y2.chunks_mut(2 * len))
            .zip(y3.chunks_mut(2 * len))
            .enumerate()
            .for_each(|(k, ((c1, c2), c3))| {
                self.scatter_pair(first + 2 * k, shape, x, [c1, c2, c3]);
            });
    }

    /// Accumulate all cells of slab `i3` into the output slices `i3 - 1` and
    /// `i3`, passed as one `2 * n1 * n2` chunk per component.
    fn scatter_pair(&self, i3: usize, shape: Shape3, x: &VectorField3, y: [&mut [f32]; 3]) {
        let len = shape.slice_len();
        // Trailing single slice has no partner in this phase.
        if y[0].len() < 2 * len {
            return;
        }
        let n1 = shape.n1;
        let xs: [(&[f32], &[f32]); 3] = [0, 1, 2].map(|c| {
            let comp = x.component(c);
            (comp.slice(i3), comp.slice(i3 - 1))
        });
        let mut ys: Vec<(&mut [f32], &mut [f32])> = y
            .into_iter()
            .map(|chunk| {
                let (lo, hi) = chunk.split_at_mut(len);
                (hi, lo)
            })
            .collect();

        for i2 in 1..shape.n2 {
            let o0 = n1 * i2;
            let o1 = n1 * (i2 - 1);
            for i1 in 1..n1 {
                let i1m = i1 - 1;
                let w = self.wp.map_or(1.0, |wp| wp.get(i1, i2, i3));
                let wps = w * w;
                if wps == 0.0 {
                    continue;
                }
                let [d11, d12, d13, d22, d23, d33] = self
                    .tensors
                    .map_or(IDENTITY, |t| t.tensor_at(i1, i2, i3));

                for ((x0, x1), (y0, y1)) in xs.iter().zip(ys.iter_mut()) {
                    // x0/y0: slice i3, x1/y1: slice i3 - 1.
                    let xa = x0[o0 + i1] - x1[o1 + i1m];
                    let xb = x0[o1 + i1] - x1[o0 + i1m];
                    let xc = x1[o0 + i1] - x0[o1 + i1m];
                    let xd = x1[o1 + i1] - x0[o0 + i1m];

                    let g1 = 0.25 * (xa + xb + xc + xd) * wps;
                    let g2 = 0.25 * (xa - xb + xc - xd) * wps;
                    let g3 = 0.25 * (xa + xb - xc - xd) * wps;

                    let h1 = d11 * g1 + d12 * g2 + d13 * g3;
                    let h2 = d12 * g1 + d22 * g2 + d23 * g3;
                    let h3 = d13 * g1 + d23 * g2 + d33 * g3;

                    let ya = 0.25 * (h1 + h2 + h3);
                    let yb = 0.25 * (h1 - h2 + h3);
                    let yc = 0.25 * (h1 + h2 - h3);
                    let yd = 0.25 * (h1 - h2 - h3);

                    y0[o0 + i1] += ya;
                    y0[o0 + i1m] -= yd;
                    y0[o1 + i1] += yb;
                    y0[o1 + i1m] -= yc;
                    y1[o0 + i1] += yc;
                    y1[o0 + i1m] -= yb;
                    y1[o1 + i1] += yd;
                    y1[o1 + i1m] -= ya;
                }
            }
        }
    }
}

impl LinearOperator for StiffnessOperator<'_> {
    fn apply(&self, x: &VectorField3, y: &mut VectorField3) {
        let shape = x.shape();
        assert_eq!(shape, y.shape(), "stiffness operator: x and y grids differ");
        if let Some(wp) = self.wp {
            assert_eq!(shape, wp.shape(), "stiffness operator: mask grid differs");
        }
        y.zero();
        if shape.n1 < 2 || shape.n2 < 2 || shape.n3 < 2 {
            return;
        }
        self.scatter_phase(x, y, 1);
        self.scatter_phase(x, y, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensors::DenseTensors;
    use nalgebra::{Matrix3, Vector3};

    fn pseudo_random_field(shape: Shape3, seed: u32) -> VectorField3 {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / (1u32 << 24) as f32 - 0.5
        };
        let mut v = VectorField3::new(shape);
        for c in v.components_mut() {
            for s in c.as_mut_slice() {
                *s = next();
            }
        }
        v
    }

    fn skewed_tensors(shape: Shape3) -> DenseTensors {
        DenseTensors::from_fn(shape, |i1, i2, i3| {
            let t = 0.1 * (i1 + i2 + i3) as f32;
            Matrix3::new(1.0 + t, 0.2, 0.1, 0.2, 0.8, -0.1, 0.1, -0.1, 0.5 + t)
        })
    }

    #[test]
    fn zero_input_gives_zero_output() {
        let shape = Shape3::new(5, 4, 6);
        let op = StiffnessOperator::new(None, None);
        let x = VectorField3::new(shape);
        let mut y = pseudo_random_field(shape, 3);
        op.apply(&x, &mut y);
        assert_eq!(y.max_abs(), 0.0);
    }

    #[test]
    fn constant_fields_are_in_the_null_space() {
        let shape = Shape3::new(4, 5, 5);
        let tensors = skewed_tensors(shape);
        let op = StiffnessOperator::new(Some(&tensors), None);
        let mut x = VectorField3::new(shape);
        for i3 in 0..shape.n3 {
            for i2 in 0..shape.n2 {
                for i1 in 0..shape.n1 {
                    x.set(i1, i2, i3, Vector3::new(1.5, -2.0, 0.25));
                }
            }
        }
        let mut y = VectorField3::new(shape);
        op.apply(&x, &mut y);
        assert!(y.max_abs() < 1e-5, "max |Ax| = {}", y.max_abs());
    }

    #[test]
    fn operator_is_symmetric_and_positive() {
        let shape = Shape3::new(6, 5, 7);
        let tensors = skewed_tensors(shape);
        let wp = ScalarField3::from_fn(shape, |_, i2, _| if i2 == 2 { 0.0 } else { 1.0 });
        let op = StiffnessOperator::new(Some(&tensors), Some(&wp));
        let x = pseudo_random_field(shape, 11);
        let z = pseudo_random_field(shape, 29);
        let mut ax = VectorField3::new(shape);
        let mut az = VectorField3::new(shape);
        op.apply(&x, &mut ax);
        op.apply(&z, &mut az);
        let lhs = ax.dot(&z);
        let rhs = x.dot(&az);
        assert!(
            (lhs - rhs).abs() < 1e-4 * lhs.abs().max(1.0),
            "<Ax,z>={lhs} <x,Az>={rhs}"
        );
        assert!(x.dot(&ax) > 0.0);
    }

    #[test]
    fn masked_cells_contribute_nothing() {
        let shape = Shape3::new(3, 3, 3);
        let wp = ScalarField3::new(shape);
        let op = StiffnessOperator::new(None, Some(&wp));
        let x = pseudo_random_field(shape, 5);
        let mut y = VectorField3::new(shape);
        op.apply(&x, &mut y);
        assert_eq!(y.max_abs(), 0.0);
    }

    #[test]
    fn components_do_not_mix() {
        let shape = Shape3::new(4, 4, 4);
        let op = StiffnessOperator::new(None, None);
        let mut x = VectorField3::new(shape);
        x.component_mut(1).set(2, 2, 2, 1.0);
        let mut y = VectorField3::new(shape);
        op.apply(&x, &mut y);
        assert_eq!(y.component(0).max_abs(), 0.0);
        assert_eq!(y.component(2).max_abs(), 0.0);
        assert!(y.component(1).get(2, 2, 2) > 0.0);
    }

    #[test]
    fn odd_and_even_phases_cover_every_slab() {
        // Serial reference: accumulate every slab in order.
        let shape = Shape3::new(3, 4, 6);
        let op = StiffnessOperator::new(None, None);
        let x = pseudo_random_field(shape, 7);
        let mut y = VectorField3::new(shape);
        op.apply(&x, &mut y);

        let mut reference = VectorField3::new(shape);
        let len = shape.slice_len();
        for i3 in 1..shape.n3 {
            let start = (i3 - 1) * len;
            let [r1, r2, r3] = reference.components_mut();
            op.scatter_pair(
                i3,
                shape,
                &x,
                [
                    &mut r1.as_mut_slice()[start..start + 2 * len],
                    &mut r2.as_mut_slice()[start..start + 2 * len],
                    &mut r3.as_mut_slice()[start..start + 2 * len],
                ],
            );
        }
        for c in 0..3 {
            for (a, b) in y
                .component(c)
                .as_slice()
                .iter()
                .zip(reference.component(c).as_slice())
            {
                assert!((a - b).abs() < 1e-6);
            }
        }
    }
}
