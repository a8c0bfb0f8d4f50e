//! Three co-indexed scalar fields `{r1, r2, r3}`: one 3D vector per sample.
use super::scalar::ScalarField3;
use super::shape::{Shape3, ShapeMismatch};
use nalgebra::Vector3;

#[derive(Clone, Debug, PartialEq)]
pub struct VectorField3 {
    components: [ScalarField3; 3],
}

impl VectorField3 {
    /// Zero vector field on `shape`.
    pub fn new(shape: Shape3) -> Self {
        Self {
            components: [
                ScalarField3::new(shape),
                ScalarField3::new(shape),
                ScalarField3::new(shape),
            ],
        }
    }

    /// Assemble from three components that must share one grid.
    pub fn from_components(components: [ScalarField3; 3]) -> Result<Self, ShapeMismatch> {
        let shape = components[0].shape();
        shape.check(components[1].shape(), "component r2")?;
        shape.check(components[2].shape(), "component r3")?;
        Ok(Self { components })
    }

    pub fn into_components(self) -> [ScalarField3; 3] {
        self.components
    }

    #[inline]
    pub fn shape(&self) -> Shape3 {
        self.components[0].shape()
    }

    #[inline]
    pub fn component(&self, i: usize) -> &ScalarField3 {
        &self.components[i]
    }

    #[inline]
    pub fn component_mut(&mut self, i: usize) -> &mut ScalarField3 {
        &mut self.components[i]
    }

    #[inline]
    pub fn components(&self) -> &[ScalarField3; 3] {
        &self.components
    }

    #[inline]
    pub fn components_mut(&mut self) -> &mut [ScalarField3; 3] {
        &mut self.components
    }

    pub fn get(&self, i1: usize, i2: usize, i3: usize) -> Vector3<f32> {
        let idx = self.shape().idx(i1, i2, i3);
        Vector3::new(
            self.components[0].as_slice()[idx],
            self.components[1].as_slice()[idx],
            self.components[2].as_slice()[idx],
        )
    }

    pub fn set(&mut self, i1: usize, i2: usize, i3: usize, v: Vector3<f32>) {
        let idx = self.shape().idx(i1, i2, i3);
        for (c, value) in self.components.iter_mut().zip(v.iter()) {
            c.as_mut_slice()[idx] = *value;
        }
    }

    pub fn zero(&mut self) {
        for c in &mut self.components {
            c.fill(0.0);
        }
    }

    pub fn copy_from(&mut self, other: &VectorField3) {
        for (dst, src) in self.components.iter_mut().zip(other.components.iter()) {
            dst.copy_from(src);
        }
    }

    /// Sum of the component inner products.
    pub fn dot(&self, other: &VectorField3) -> f64 {
        self.components
            .iter()
            .zip(other.components.iter())
            .map(|(a, b)| a.dot(b))
            .sum()
    }

    /// Euclidean norm over all components.
    pub fn norm2(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// `self += alpha * x`
    pub fn axpy(&mut self, alpha: f32, x: &VectorField3) {
        assert_eq!(self.shape(), x.shape(), "axpy between different grids");
        for (y, x) in self.components.iter_mut().zip(x.components.iter()) {
            for (yi, &xi) in y.as_mut_slice().iter_mut().zip(x.as_slice()) {
                *yi += alpha * xi;
            }
        }
    }

    /// `self = beta * self + x`
    pub fn scale_add(&mut self, beta: f32, x: &VectorField3) {
        assert_eq!(self.shape(), x.shape(), "scale_add between different grids");
        for (y, x) in self.components.iter_mut().zip(x.components.iter()) {
            for (yi, &xi) in y.as_mut_slice().iter_mut().zip(x.as_slice()) {
                *yi = beta * *yi + xi;
            }
        }
    }

    pub fn max_abs(&self) -> f32 {
        self.components
            .iter()
            .fold(0.0f32, |acc, c| acc.max(c.max_abs()))
    }
}
