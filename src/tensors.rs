//! Per-sample symmetric 3×3 metric tensors steering the regularization.
//!
//! Tensors are read through the [`TensorField`] trait so that the stiffness
//! operator does not care how they are stored. Components are packed as
//! `[d11, d12, d13, d22, d23, d33]`.
use crate::field::{ScalarField3, Shape3, ShapeMismatch};
use nalgebra::Matrix3;

/// Read-only access to a tensor per grid point.
pub trait TensorField: Sync {
    /// Return `[d11, d12, d13, d22, d23, d33]` at `(i1, i2, i3)`.
    fn tensor_at(&self, i1: usize, i2: usize, i3: usize) -> [f32; 6];

    /// Grid the tensors are stored on, `None` for fields defined everywhere.
    fn shape(&self) -> Option<Shape3> {
        None
    }

    fn matrix_at(&self, i1: usize, i2: usize, i3: usize) -> Matrix3<f32> {
        unpack(self.tensor_at(i1, i2, i3))
    }
}

/// The same scaled identity at every point.
#[derive(Clone, Copy, Debug)]
pub struct IsotropicTensors {
    pub scale: f32,
}

impl Default for IsotropicTensors {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl TensorField for IsotropicTensors {
    #[inline]
    fn tensor_at(&self, _i1: usize, _i2: usize, _i3: usize) -> [f32; 6] {
        let s = self.scale;
        [s, 0.0, 0.0, s, 0.0, s]
    }
}

/// Densely stored tensors, six scalar fields on one grid.
#[derive(Clone, Debug)]
pub struct DenseTensors {
    shape: Shape3,
    /// `shape.len()` packed entries.
    entries: Vec<[f32; 6]>,
}

impl DenseTensors {
    /// Identity tensors on `shape`.
    pub fn identity(shape: Shape3) -> Self {
        Self {
            shape,
            entries: vec![[1.0, 0.0, 0.0, 1.0, 0.0, 1.0]; shape.len()],
        }
    }

    /// Build from the six component fields `d11, d12, d13, d22, d23, d33`.
    pub fn from_components(d: [&ScalarField3; 6]) -> Result<Self, ShapeMismatch> {
        let shape = d[0].shape();
        for (k, field) in d.iter().enumerate().skip(1) {
            shape.check(field.shape(), COMPONENT_NAMES[k])?;
        }
        let entries = (0..shape.len())
            .map(|i| {
                [
                    d[0].as_slice()[i],
                    d[1].as_slice()[i],
                    d[2].as_slice()[i],
                    d[3].as_slice()[i],
                    d[4].as_slice()[i],
                    d[5].as_slice()[i],
                ]
            })
            .collect();
        Ok(Self { shape, entries })
    }

    /// Build by evaluating a matrix per point. Only the upper triangle of the
    /// returned matrix is read.
    pub fn from_fn(
        shape: Shape3,
        mut f: impl FnMut(usize, usize, usize) -> Matrix3<f32>,
    ) -> Self {
        let mut entries = Vec::with_capacity(shape.len());
        for i3 in 0..shape.n3 {
            for i2 in 0..shape.n2 {
                for i1 in 0..shape.n1 {
                    entries.push(pack(&f(i1, i2, i3)));
                }
            }
        }
        Self { shape, entries }
    }

    pub fn set_matrix(&mut self, i1: usize, i2: usize, i3: usize, m: &Matrix3<f32>) {
        let idx = self.shape.idx(i1, i2, i3);
        self.entries[idx] = pack(m);
    }
}

impl TensorField for DenseTensors {
    #[inline]
    fn tensor_at(&self, i1: usize, i2: usize, i3: usize) -> [f32; 6] {
        self.entries[self.shape.idx(i1, i2, i3)]
    }

    fn shape(&self) -> Option<Shape3> {
        Some(self.shape)
    }
}

const COMPONENT_NAMES: [&str; 6] = ["d11", "d12", "d13", "d22", "d23", "d33"];

fn pack(m: &Matrix3<f32>) -> [f32; 6] {
    [m[(0, 0)], m[(0, 1)], m[(0, 2)], m[(1, 1)], m[(1, 2)], m[(2, 2)]]
}

fn unpack(d: [f32; 6]) -> Matrix3<f32> {
    Matrix3::new(d[0], d[1], d[2], d[1], d[3], d[4], d[2], d[4], d[5])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isotropic_is_scaled_identity() {
        let t = IsotropicTensors { scale: 2.0 };
        assert_eq!(t.matrix_at(3, 1, 4), Matrix3::identity() * 2.0);
    }

    #[test]
    fn dense_packs_upper_triangle() {
        let shape = Shape3::new(2, 2, 2);
        let m = Matrix3::new(1.0, 0.2, 0.3, 0.2, 2.0, 0.4, 0.3, 0.4, 3.0);
        let t = DenseTensors::from_fn(shape, |i1, _, _| if i1 == 1 { m } else { Matrix3::identity() });
        assert_eq!(t.tensor_at(1, 0, 1), [1.0, 0.2, 0.3, 2.0, 0.4, 3.0]);
        assert_eq!(t.matrix_at(1, 1, 0), m);
        assert_eq!(t.matrix_at(0, 1, 0), Matrix3::identity());
    }

    #[test]
    fn set_matrix_overwrites_one_sample() {
        let shape = Shape3::new(3, 2, 2);
        let mut t = DenseTensors::identity(shape);
        let m = Matrix3::new(2.0, 0.5, 0.0, 0.5, 1.0, -0.25, 0.0, -0.25, 0.5);
        t.set_matrix(2, 1, 0, &m);
        assert_eq!(t.matrix_at(2, 1, 0), m);
        assert_eq!(t.tensor_at(2, 1, 0), [2.0, 0.5, 0.0, 1.0, -0.25, 0.5]);
        assert_eq!(t.matrix_at(1, 1, 0), Matrix3::identity());
    }

    #[test]
    fn dense_components_require_one_grid() {
        let a = ScalarField3::filled(Shape3::new(2, 2, 2), 1.0);
        let z = ScalarField3::new(Shape3::new(2, 2, 2));
        let bad = ScalarField3::new(Shape3::new(2, 2, 1));
        let err = DenseTensors::from_components([&a, &z, &z, &a, &bad, &a]).unwrap_err();
        assert_eq!(err.what, "d23");
        let ok = DenseTensors::from_components([&a, &z, &z, &a, &z, &a]).unwrap();
        assert_eq!(ok.tensor_at(1, 1, 1), [1.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
    }
}
