//! Exact Euclidean closest-point transform on the grid.
//!
//! Feature points are the samples whose mask value differs from a level
//! value. For every sample the transform returns the distance to, and the
//! index of, the nearest feature point. The squared distance is separable,
//! so three 1D lower-envelope passes (one per axis) compute it exactly while
//! carrying the index of the winning feature along (Felzenszwalb &
//! Huttenlocher). Ties are broken towards the lower index of each pass.
use crate::field::{ScalarField3, Shape3};

#[derive(Clone, Copy, Debug, Default)]
pub struct ClosestPointTransform;

/// Result of [`ClosestPointTransform::apply`].
#[derive(Clone, Debug)]
pub struct ClosestPoints {
    shape: Shape3,
    /// Euclidean distance to the nearest feature, `+∞` if there is none.
    pub distance: ScalarField3,
    /// Linear index of the nearest feature (the sample itself if none).
    nearest: Vec<usize>,
}

impl ClosestPoints {
    /// `[k1, k2, k3]` of the feature nearest to `(i1, i2, i3)`, or `None` when
    /// the mask has no feature point at all.
    pub fn nearest(&self, i1: usize, i2: usize, i3: usize) -> Option<[usize; 3]> {
        let idx = self.shape.idx(i1, i2, i3);
        self.nearest_linear(idx).map(|k| self.shape.coords(k))
    }

    /// Linear variant of [`ClosestPoints::nearest`].
    pub fn nearest_linear(&self, idx: usize) -> Option<usize> {
        self.distance.as_slice()[idx]
            .is_finite()
            .then_some(self.nearest[idx])
    }

    /// Split into the three index fields `k1, k2, k3`.
    pub fn index_fields(&self) -> [Vec<usize>; 3] {
        let mut k = [
            Vec::with_capacity(self.nearest.len()),
            Vec::with_capacity(self.nearest.len()),
            Vec::with_capacity(self.nearest.len()),
        ];
        for &idx in &self.nearest {
            let [k1, k2, k3] = self.shape.coords(idx);
            k[0].push(k1);
            k[1].push(k2);
            k[2].push(k3);
        }
        k
    }
}

impl ClosestPointTransform {
    /// Distance and nearest index to the samples where `mask != level`.
    pub fn apply(&self, level: f32, mask: &ScalarField3) -> ClosestPoints {
        let shape = mask.shape();
        let mut d2: Vec<f64> = mask
            .as_slice()
            .iter()
            .map(|&m| if m != level { 0.0 } else { f64::INFINITY })
            .collect();
        let mut nearest: Vec<usize> = (0..shape.len()).collect();

        if !shape.is_empty() {
            let mut pass = EnvelopePass::default();
            let (n1, n2, n3) = (shape.n1, shape.n2, shape.n3);
            let len = shape.slice_len();
            for i3 in 0..n3 {
                for i2 in 0..n2 {
                    pass.run(&mut d2, &mut nearest, n1 * (i2 + n2 * i3), 1, n1);
                }
            }
            for i3 in 0..n3 {
                for i1 in 0..n1 {
                    pass.run(&mut d2, &mut nearest, i1 + len * i3, n1, n2);
                }
            }
            for i2 in 0..n2 {
                for i1 in 0..n1 {
                    pass.run(&mut d2, &mut nearest, i1 + n1 * i2, len, n3);
                }
            }
        }

        let distance = ScalarField3::from_vec(shape, d2.iter().map(|&v| v.sqrt() as f32).collect());
        ClosestPoints {
            shape,
            distance,
            nearest,
        }
    }
}

/// Scratch space for the 1D lower envelope of parabolas.
#[derive(Default)]
struct EnvelopePass {
    f: Vec<f64>,
    carried: Vec<usize>,
    v: Vec<usize>,
    z: Vec<f64>,
}

impl EnvelopePass {
    fn run(&mut self, d2: &mut [f64], nearest: &mut [usize], start: usize, stride: usize, n: usize) {
        self.f.clear();
        self.carried.clear();
        for j in 0..n {
            self.f.push(d2[start + j * stride]);
            self.carried.push(nearest[start + j * stride]);
        }
        self.v.clear();
        self.v.resize(n, 0);
        self.z.clear();
        self.z.resize(n + 1, 0.0);

        let f = &self.f;
        let (v, z) = (&mut self.v, &mut self.z);
        let mut k: Option<usize> = None;
        for q in 0..n {
            if !f[q].is_finite() {
                continue;
            }
            let qf = q as f64;
            let k_new = match k {
                None => {
                    z[0] = f64::NEG_INFINITY;
                    0
                }
                Some(mut kk) => {
                    let s = loop {
                        let p = v[kk] as f64;
                        let s = ((f[q] + qf * qf) - (f[v[kk]] + p * p)) / (2.0 * (qf - p));
                        // z[0] is -∞, so kk never drops below zero.
                        if s <= z[kk] {
                            kk -= 1;
                        } else {
                            break s;
                        }
                    };
                    z[kk + 1] = s;
                    kk + 1
                }
            };
            v[k_new] = q;
            z[k_new + 1] = f64::INFINITY;
            k = Some(k_new);
        }

        // No finite sample on this line: leave it as it is.
        if k.is_none() {
            return;
        }
        let mut kk = 0;
        for j in 0..n {
            let jf = j as f64;
            while z[kk + 1] < jf {
                kk += 1;
            }
            let p = v[kk];
            let dj = jf - p as f64;
            d2[start + j * stride] = dj * dj + f[p];
            nearest[start + j * stride] = self.carried[p];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force_d2(mask: &ScalarField3, level: f32, at: [usize; 3]) -> Option<f64> {
        let shape = mask.shape();
        (0..shape.len())
            .filter(|&k| mask.as_slice()[k] != level)
            .map(|k| {
                let c = shape.coords(k);
                (0..3)
                    .map(|a| {
                        let d = c[a] as f64 - at[a] as f64;
                        d * d
                    })
                    .sum::<f64>()
            })
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.min(d))))
    }

    #[test]
    fn matches_brute_force_on_scattered_mask() {
        let shape = Shape3::new(7, 6, 5);
        let mask = ScalarField3::from_fn(shape, |i1, i2, i3| {
            if (i1 * 7 + i2 * 3 + i3 * 11) % 13 == 0 {
                1.0
            } else {
                0.0
            }
        });
        let cpt = ClosestPointTransform.apply(0.0, &mask);
        for idx in 0..shape.len() {
            let at = shape.coords(idx);
            let expected = brute_force_d2(&mask, 0.0, at).unwrap();
            let got = cpt.distance.as_slice()[idx] as f64;
            assert!((got * got - expected).abs() < 1e-3, "at {at:?}: {got} vs {}", expected.sqrt());
            let k = cpt.nearest(at[0], at[1], at[2]).unwrap();
            assert_eq!(mask.get(k[0], k[1], k[2]), 1.0);
            let dk: f64 = (0..3).map(|a| (k[a] as f64 - at[a] as f64).powi(2)).sum();
            assert!((dk - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn features_map_to_themselves() {
        let shape = Shape3::new(4, 4, 4);
        let mask = ScalarField3::from_fn(shape, |_, i2, _| if i2 == 1 { 0.0 } else { 1.0 });
        let cpt = ClosestPointTransform.apply(0.0, &mask);
        assert_eq!(cpt.nearest(3, 2, 1), Some([3, 2, 1]));
        assert_eq!(cpt.distance.get(3, 2, 1), 0.0);
        assert_eq!(cpt.distance.get(3, 1, 1), 1.0);
        let k = cpt.nearest(3, 1, 1).unwrap();
        assert!(k == [3, 0, 1] || k == [3, 2, 1]);
        let [k1, k2, k3] = cpt.index_fields();
        let idx = shape.idx(3, 1, 1);
        assert_eq!([k1[idx], k2[idx], k3[idx]], k);
    }

    #[test]
    fn no_features_gives_infinite_distance() {
        let shape = Shape3::new(3, 3, 2);
        let mask = ScalarField3::new(shape);
        let cpt = ClosestPointTransform.apply(0.0, &mask);
        assert!(cpt.distance.as_slice().iter().all(|d| d.is_infinite()));
        assert_eq!(cpt.nearest(1, 1, 1), None);
    }
}
