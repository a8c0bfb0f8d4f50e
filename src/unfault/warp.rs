//! Bandlimited warp of an image by a Lagrangian shift field.
use crate::field::{ScalarField3, ShapeMismatch, VectorField3};
use crate::sinc::{SincInterpolator, SincParams};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Resamples images at shifted positions with a sinc kernel.
#[derive(Clone, Debug, Default)]
pub struct ImageWarper {
    interpolator: SincInterpolator,
}

impl ImageWarper {
    pub fn new(params: SincParams) -> Self {
        Self {
            interpolator: SincInterpolator::new(params),
        }
    }

    pub fn with_interpolator(interpolator: SincInterpolator) -> Self {
        Self { interpolator }
    }

    pub fn interpolator(&self) -> &SincInterpolator {
        &self.interpolator
    }

    /// `g(x) = f(x + r(x))` on every grid sample.
    pub fn apply_shifts(
        &self,
        r: &VectorField3,
        f: &ScalarField3,
    ) -> Result<ScalarField3, ShapeMismatch> {
        let shape = f.shape();
        shape.check(r.shape(), "shift field")?;
        let mut g = ScalarField3::new(shape);
        if shape.is_empty() {
            return Ok(g);
        }
        let len = shape.slice_len();
        let [r1, r2, r3] = r.components();
        let warp_slice = |i3: usize, out: &mut [f32]| {
            let (s1, s2, s3) = (r1.slice(i3), r2.slice(i3), r3.slice(i3));
            for i2 in 0..shape.n2 {
                for i1 in 0..shape.n1 {
                    let j = i1 + shape.n1 * i2;
                    out[j] = self.interpolator.interpolate(
                        f,
                        i1 as f32 + s1[j],
                        i2 as f32 + s2[j],
                        i3 as f32 + s3[j],
                    );
                }
            }
        };

        #[cfg(feature = "parallel")]
        g.as_mut_slice()
            .par_chunks_mut(len)
            .enumerate()
            .for_each(|(i3, out)| warp_slice(i3, out));

        #[cfg(not(feature = "parallel"))]
        g.as_mut_slice()
            .chunks_mut(len)
            .enumerate()
            .for_each(|(i3, out)| warp_slice(i3, out));

        Ok(g)
    }
}
