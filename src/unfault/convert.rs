//! Eulerian → Lagrangian conversion of shift fields.
//!
//! The solve yields shifts `r(x)` indexed by current (faulted) positions.
//! Warping needs `u(x)` with `u(x) = r(x + u(x))`, found by fixed-point
//! iteration starting from `u = r`. Each iteration samples `r` at the
//! positions displaced by the previous estimate with nearest-neighbour
//! rounding; samples that round outside the grid keep their previous value.
use crate::field::VectorField3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run `niter` fixed-point iterations of `u(x) = r(x + u(x))`.
pub fn convert_shifts(niter: usize, r: &VectorField3) -> VectorField3 {
    let mut u = r.clone();
    let shape = r.shape();
    if shape.is_empty() {
        return u;
    }
    for _ in 0..niter {
        let t = u.clone();
        resample_nearest(&t, r, &mut u);
    }
    u
}

/// `u[i](x) = r[i](round(x + t(x)))` for all components, skipping samples
/// whose rounded position falls outside the grid.
fn resample_nearest(t: &VectorField3, r: &VectorField3, u: &mut VectorField3) {
    let shape = r.shape();
    let len = shape.slice_len();
    let [u1, u2, u3] = u.components_mut();
    let run = |i3: usize, out: [&mut [f32]; 3]| {
        let [o1, o2, o3] = out;
        let ts = [0, 1, 2].map(|c| t.component(c).slice(i3));
        let rs = [0, 1, 2].map(|c| r.component(c).as_slice());
        for i2 in 0..shape.n2 {
            for i1 in 0..shape.n1 {
                let j = i1 + shape.n1 * i2;
                let k1 = (i1 as f32 + ts[0][j]).round() as i64;
                let k2 = (i2 as f32 + ts[1][j]).round() as i64;
                let k3 = (i3 as f32 + ts[2][j]).round() as i64;
                if !shape.contains(k1, k2, k3) {
                    continue;
                }
                let k = shape.idx(k1 as usize, k2 as usize, k3 as usize);
                o1[j] = rs[0][k];
                o2[j] = rs[1][k];
                o3[j] = rs[2][k];
            }
        }
    };

    #[cfg(feature = "parallel")]
    u1.as_mut_slice()
        .par_chunks_mut(len)
        .zip(u2.as_mut_slice().par_chunks_mut(len))
        .zip(u3.as_mut_slice().par_chunks_mut(len))
        .enumerate()
        .for_each(|(i3, ((o1, o2), o3))| run(i3, [o1, o2, o3]));

    #[cfg(not(feature = "parallel"))]
    u1.as_mut_slice()
        .chunks_mut(len)
        .zip(u2.as_mut_slice().chunks_mut(len))
        .zip(u3.as_mut_slice().chunks_mut(len))
        .enumerate()
        .for_each(|(i3, ((o1, o2), o3))| run(i3, [o1, o2, o3]));
}
