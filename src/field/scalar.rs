//! Owned single-component 3D field (`f32`), first dimension fastest.
//!
//! Used for weight masks, images and each component of a [`VectorField3`].
//! Provides slice access per `i3` and a contiguous view of the whole buffer.
//!
//! [`VectorField3`]: super::VectorField3
use super::shape::Shape3;

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField3 {
    shape: Shape3,
    /// Backing storage, `shape.len()` values.
    data: Vec<f32>,
}

impl ScalarField3 {
    /// Construct a zero-initialized field.
    pub fn new(shape: Shape3) -> Self {
        Self::filled(shape, 0.0)
    }

    /// Construct a field with every sample set to `value`.
    pub fn filled(shape: Shape3, value: f32) -> Self {
        Self {
            shape,
            data: vec![value; shape.len()],
        }
    }

    /// Wrap an existing buffer. Panics when the length does not match.
    pub fn from_vec(shape: Shape3, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            shape.len(),
            "buffer length does not match grid {shape}"
        );
        Self { shape, data }
    }

    /// Build a field by evaluating `f(i1, i2, i3)` at every grid point.
    pub fn from_fn(shape: Shape3, mut f: impl FnMut(usize, usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(shape.len());
        for i3 in 0..shape.n3 {
            for i2 in 0..shape.n2 {
                for i1 in 0..shape.n1 {
                    data.push(f(i1, i2, i3));
                }
            }
        }
        Self { shape, data }
    }

    #[inline]
    pub fn shape(&self) -> Shape3 {
        self.shape
    }

    #[inline]
    pub fn idx(&self, i1: usize, i2: usize, i3: usize) -> usize {
        self.shape.idx(i1, i2, i3)
    }

    #[inline]
    pub fn get(&self, i1: usize, i2: usize, i3: usize) -> f32 {
        self.data[self.idx(i1, i2, i3)]
    }

    #[inline]
    pub fn set(&mut self, i1: usize, i2: usize, i3: usize, v: f32) {
        let i = self.idx(i1, i2, i3);
        self.data[i] = v;
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Samples of slice `i3` (`n1 * n2` values).
    #[inline]
    pub fn slice(&self, i3: usize) -> &[f32] {
        let len = self.shape.slice_len();
        &self.data[i3 * len..(i3 + 1) * len]
    }

    #[inline]
    pub fn slice_mut(&mut self, i3: usize) -> &mut [f32] {
        let len = self.shape.slice_len();
        &mut self.data[i3 * len..(i3 + 1) * len]
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Copy all samples from `other`. Panics on shape mismatch.
    pub fn copy_from(&mut self, other: &ScalarField3) {
        assert_eq!(self.shape, other.shape, "copy between different grids");
        self.data.copy_from_slice(&other.data);
    }

    /// Inner product accumulated in `f64`.
    pub fn dot(&self, other: &ScalarField3) -> f64 {
        assert_eq!(self.shape, other.shape, "dot between different grids");
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| a as f64 * b as f64)
            .sum()
    }

    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0f32, |acc, v| acc.max(v.abs()))
    }
}
