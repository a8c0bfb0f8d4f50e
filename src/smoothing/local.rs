//! Local (diffusion) smoothing filter.
//!
//! Along one axis every grid line `x` is replaced by the solution `y` of
//!
//! ```text
//! y[j] + e[j] (y[j] - y[j-1]) + e[j+1] (y[j] - y[j+1]) = x[j]
//! ```
//!
//! with edge coefficients `e[j] = c · w[j-1] · w[j]`, i.e. `(I + Gᵀ c W G) y = x`.
//! The system is tridiagonal and diagonally dominant, solved with the Thomas
//! algorithm. Zero weights cut the line, so nothing diffuses across them.
//!
//! A full smoothing pass sweeps axes 3, 2, 1 and then 1, 2, 3, each sweep with
//! `c = σ²/4`; the composite filter is symmetric positive definite and its
//! impulse response has variance ≈ σ² along each axis. Half-widths below one
//! sample leave that axis untouched.
use super::Smoother;
use crate::field::{ScalarField3, Shape3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, Default)]
pub struct LocalSmoother;

impl Smoother for LocalSmoother {
    fn smooth(
        &self,
        sigma1: f32,
        sigma2a: f32,
        sigma2b: f32,
        weights: Option<&ScalarField3>,
        field: &mut ScalarField3,
    ) {
        let shape = field.shape();
        if let Some(w) = weights {
            assert_eq!(w.shape(), shape, "smoothing weights grid differs");
        }
        if shape.is_empty() {
            return;
        }
        let w = weights.map(|w| w.as_slice());
        let coeffs = [sigma1, sigma2a, sigma2b].map(coefficient);
        for axis in [2, 1, 0].into_iter().chain([0, 1, 2]) {
            if let Some(c) = coeffs[axis] {
                match axis {
                    0 => smooth_axis1(c, shape, w, field.as_mut_slice()),
                    1 => smooth_axis2(c, shape, w, field.as_mut_slice()),
                    _ => smooth_axis3(c, shape, w, field.as_mut_slice()),
                }
            }
        }
    }
}

fn coefficient(sigma: f32) -> Option<f32> {
    (sigma >= 1.0).then(|| 0.25 * sigma * sigma)
}

/// Scratch buffers for gathering one strided line.
#[derive(Default)]
struct LineBuffers {
    line: Vec<f32>,
    weights: Vec<f32>,
    work: Vec<f32>,
}

impl LineBuffers {
    /// Gather `n` samples starting at `start` with `stride`, solve, and leave
    /// the result in `self.line`.
    fn solve_strided(
        &mut self,
        c: f32,
        data: &[f32],
        w: Option<&[f32]>,
        start: usize,
        stride: usize,
        n: usize,
    ) {
        self.line.clear();
        self.line.extend((0..n).map(|j| data[start + j * stride]));
        let wl = match w {
            Some(w) => {
                self.weights.clear();
                self.weights.extend((0..n).map(|j| w[start + j * stride]));
                Some(self.weights.as_slice())
            }
            None => None,
        };
        solve_line(c, wl, &mut self.line, &mut self.work);
    }
}

/// First dimension: every row of `n1` samples is contiguous.
fn smooth_axis1(c: f32, shape: Shape3, w: Option<&[f32]>, data: &mut [f32]) {
    let n1 = shape.n1;
    let row_weights = |k: usize| w.map(|w| &w[k * n1..(k + 1) * n1]);

    #[cfg(feature = "parallel")]
    data.par_chunks_mut(n1)
        .enumerate()
        .for_each_init(Vec::new, |work, (k, row)| {
            solve_line(c, row_weights(k), row, work);
        });

    #[cfg(not(feature = "parallel"))]
    {
        let mut work = Vec::new();
        for (k, row) in data.chunks_mut(n1).enumerate() {
            solve_line(c, row_weights(k), row, &mut work);
        }
    }
}

/// Second dimension: lines stay inside one `i3` slice.
fn smooth_axis2(c: f32, shape: Shape3, w: Option<&[f32]>, data: &mut [f32]) {
    let (n1, n2) = (shape.n1, shape.n2);
    let len = shape.slice_len();
    let run = |i3: usize, slice: &mut [f32], buf: &mut LineBuffers| {
        let ws = w.map(|w| &w[i3 * len..(i3 + 1) * len]);
        for i1 in 0..n1 {
            buf.solve_strided(c, slice, ws, i1, n1, n2);
            for (i2, &v) in buf.line.iter().enumerate() {
                slice[i1 + n1 * i2] = v;
            }
        }
    };

    #[cfg(feature = "parallel")]
    data.par_chunks_mut(len)
        .enumerate()
        .for_each_init(LineBuffers::default, |buf, (i3, slice)| run(i3, slice, buf));

    #[cfg(not(feature = "parallel"))]
    {
        let mut buf = LineBuffers::default();
        for (i3, slice) in data.chunks_mut(len).enumerate() {
            run(i3, slice, &mut buf);
        }
    }
}

/// Third dimension: lines cross slices, so each `i2` column block is solved
/// into its own buffer (`n1 × n3`, `i3` fastest) and written back afterwards.
fn smooth_axis3(c: f32, shape: Shape3, w: Option<&[f32]>, data: &mut [f32]) {
    let (n1, n2, n3) = (shape.n1, shape.n2, shape.n3);
    let len = shape.slice_len();
    let src: &[f32] = data;
    let column = |i2: usize, buf: &mut LineBuffers| -> Vec<f32> {
        let mut out = Vec::with_capacity(n1 * n3);
        for i1 in 0..n1 {
            buf.solve_strided(c, src, w, i1 + n1 * i2, len, n3);
            out.extend_from_slice(&buf.line);
        }
        out
    };

    #[cfg(feature = "parallel")]
    let columns: Vec<Vec<f32>> = (0..n2)
        .into_par_iter()
        .map_init(LineBuffers::default, |buf, i2| column(i2, buf))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let columns: Vec<Vec<f32>> = {
        let mut buf = LineBuffers::default();
        (0..n2).map(|i2| column(i2, &mut buf)).collect()
    };

    for (i2, col) in columns.iter().enumerate() {
        for i1 in 0..n1 {
            for i3 in 0..n3 {
                data[i1 + n1 * i2 + len * i3] = col[i1 * n3 + i3];
            }
        }
    }
}

/// Solve `(I + Gᵀ c W G) y = x` in place for one line.
fn solve_line(c: f32, w: Option<&[f32]>, x: &mut [f32], work: &mut Vec<f32>) {
    let n = x.len();
    if n < 2 {
        return;
    }
    // e[j] couples j-1 and j; e[0] = e[n] = 0.
    work.clear();
    work.resize(2 * n + 1, 0.0);
    let (e, cp) = work.split_at_mut(n + 1);
    for j in 1..n {
        e[j] = match w {
            Some(w) => c * w[j - 1] * w[j],
            None => c,
        };
    }

    let diag = |j: usize| 1.0 + e[j] + e[j + 1];
    let mut m = diag(0);
    cp[0] = -e[1] / m;
    x[0] /= m;
    for j in 1..n {
        m = diag(j) + e[j] * cp[j - 1];
        cp[j] = -e[j + 1] / m;
        x[j] = (x[j] + e[j] * x[j - 1]) / m;
    }
    for j in (0..n - 1).rev() {
        x[j] -= cp[j] * x[j + 1];
    }
}
