//! Bandlimited interpolation with a Kaiser-windowed sinc kernel.
//!
//! The kernel has `length` taps (even). Weights for `table_size` fractional
//! shifts in `[0, 1]` are tabulated once at construction; each row is
//! normalized to unit sum so constant images are reproduced exactly.
//! Integer positions reproduce the input samples.
use crate::field::ScalarField3;
use serde::{Deserialize, Serialize};

/// How samples outside the grid are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extrapolation {
    /// Samples outside the grid are zero.
    #[default]
    Zero,
    /// Samples outside the grid repeat the nearest edge sample.
    Constant,
}

/// Kernel design parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SincParams {
    /// Number of taps per dimension (even, ≥ 2).
    pub length: usize,
    /// Number of tabulated fractional shifts (≥ 2).
    pub table_size: usize,
    /// Kaiser window shape parameter.
    pub kaiser_beta: f64,
    pub extrapolation: Extrapolation,
}

impl Default for SincParams {
    fn default() -> Self {
        Self {
            length: 8,
            table_size: 1025,
            kaiser_beta: 6.0,
            extrapolation: Extrapolation::Zero,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SincInterpolator {
    params: SincParams,
    /// `table_size × length` weights, row-major.
    table: Vec<f32>,
}

impl Default for SincInterpolator {
    fn default() -> Self {
        Self::new(SincParams::default())
    }
}

impl SincInterpolator {
    pub fn new(params: SincParams) -> Self {
        assert!(
            params.length >= 2 && params.length % 2 == 0,
            "sinc length must be even and at least 2"
        );
        assert!(params.table_size >= 2, "sinc table needs at least two rows");
        let table = build_table(&params);
        Self { params, table }
    }

    pub fn params(&self) -> &SincParams {
        &self.params
    }

    /// Index of the first tap and the tap weights for position `x`.
    #[inline]
    fn taps(&self, x: f32) -> (i64, &[f32]) {
        let len = self.params.length;
        let base = x.floor();
        let frac = x - base;
        let row = (frac * (self.params.table_size - 1) as f32).round() as usize;
        let row = row.min(self.params.table_size - 1);
        let first = base as i64 - (len as i64 / 2) + 1;
        (first, &self.table[row * len..(row + 1) * len])
    }

    #[inline]
    fn sample(&self, image: &ScalarField3, k1: i64, k2: i64, k3: i64) -> f32 {
        let shape = image.shape();
        if shape.contains(k1, k2, k3) {
            return image.get(k1 as usize, k2 as usize, k3 as usize);
        }
        match self.params.extrapolation {
            Extrapolation::Zero => 0.0,
            Extrapolation::Constant => {
                let clamp = |k: i64, n: usize| k.clamp(0, n as i64 - 1) as usize;
                image.get(clamp(k1, shape.n1), clamp(k2, shape.n2), clamp(k3, shape.n3))
            }
        }
    }

    /// Bandlimited value of `image` at fractional sample coordinates.
    pub fn interpolate(&self, image: &ScalarField3, x1: f32, x2: f32, x3: f32) -> f32 {
        if image.shape().is_empty() {
            return 0.0;
        }
        let (k1, w1) = self.taps(x1);
        let (k2, w2) = self.taps(x2);
        let (k3, w3) = self.taps(x3);
        let mut acc = 0.0f32;
        for (m3, &c3) in w3.iter().enumerate() {
            if c3 == 0.0 {
                continue;
            }
            let j3 = k3 + m3 as i64;
            for (m2, &c2) in w2.iter().enumerate() {
                if c2 == 0.0 {
                    continue;
                }
                let j2 = k2 + m2 as i64;
                let mut row = 0.0f32;
                for (m1, &c1) in w1.iter().enumerate() {
                    if c1 != 0.0 {
                        row += c1 * self.sample(image, k1 + m1 as i64, j2, j3);
                    }
                }
                acc += c3 * c2 * row;
            }
        }
        acc
    }
}

fn build_table(params: &SincParams) -> Vec<f32> {
    let len = params.length;
    let half = (len / 2) as f64;
    let i0_beta = bessel_i0(params.kaiser_beta);
    let mut table = Vec::with_capacity(params.table_size * len);
    let mut row = vec![0.0f64; len];
    for r in 0..params.table_size {
        let frac = r as f64 / (params.table_size - 1) as f64;
        for (m, w) in row.iter_mut().enumerate() {
            let offset = frac + half - 1.0 - m as f64;
            let t = offset / half;
            let window = if t.abs() >= 1.0 {
                0.0
            } else {
                bessel_i0(params.kaiser_beta * (1.0 - t * t).sqrt()) / i0_beta
            };
            *w = sinc(offset) * window;
        }
        let sum: f64 = row.iter().sum();
        table.extend(row.iter().map(|&w| (w / sum) as f32));
    }
    table
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else if x.fract() == 0.0 {
        0.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}

/// Modified Bessel function of the first kind, order zero (power series).
fn bessel_i0(x: f64) -> f64 {
    let q = 0.25 * x * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..64 {
        term *= q / (k * k) as f64;
        sum += term;
        if term < sum * 1e-16 {
            break;
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Shape3;

    fn ramp(shape: Shape3) -> ScalarField3 {
        ScalarField3::from_fn(shape, |i1, i2, i3| (i1 as f32) * 0.5 + i2 as f32 - 0.25 * i3 as f32)
    }

    #[test]
    fn integer_positions_reproduce_samples() {
        let shape = Shape3::new(6, 5, 4);
        let f = ramp(shape);
        let si = SincInterpolator::default();
        for (i1, i2, i3) in [(0, 0, 0), (3, 2, 1), (5, 4, 3)] {
            let v = si.interpolate(&f, i1 as f32, i2 as f32, i3 as f32);
            assert!((v - f.get(i1, i2, i3)).abs() < 1e-5);
        }
    }

    #[test]
    fn table_rows_sum_to_one_and_half_shift_is_symmetric() {
        let si = SincInterpolator::default();
        let (_, w) = si.taps(0.5);
        let sum: f32 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for m in 0..w.len() / 2 {
            assert!((w[m] - w[w.len() - 1 - m]).abs() < 1e-6);
        }
    }

    #[test]
    fn constant_image_is_reproduced_with_constant_extrapolation() {
        let shape = Shape3::new(5, 5, 5);
        let f = ScalarField3::filled(shape, 3.0);
        let si = SincInterpolator::new(SincParams {
            extrapolation: Extrapolation::Constant,
            ..Default::default()
        });
        let v = si.interpolate(&f, 0.3, 4.7, 2.25);
        assert!((v - 3.0).abs() < 1e-4, "v={v}");
    }

    #[test]
    fn zero_extrapolation_fades_outside() {
        let shape = Shape3::new(4, 4, 4);
        let f = ScalarField3::filled(shape, 1.0);
        let si = SincInterpolator::default();
        assert_eq!(si.interpolate(&f, 20.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn smooth_signal_between_samples() {
        let shape = Shape3::new(32, 1, 1);
        let f = ScalarField3::from_fn(shape, |i1, _, _| (0.3 * i1 as f32).sin());
        let si = SincInterpolator::default();
        let x = 15.4f32;
        let v = si.interpolate(&f, x, 0.0, 0.0);
        assert!((v - (0.3 * x).sin()).abs() < 1e-2, "v={v}");
    }
}
