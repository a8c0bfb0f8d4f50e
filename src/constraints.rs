//! Slip-vector constraints across faults.
//!
//! A [`ConstraintPair`] ties two grid points on opposite sides of a fault to
//! one slip vector `s`: the unknown shift field should equal `s` at point A
//! and `-s` at point B. The set is used twice during a solve:
//!
//! - [`ConstraintSet::seed`] writes `±s` into the initial CG iterate;
//! - [`ConstraintSet::project`] replaces the values at A and B by their mean,
//!   which the preconditioner applies to every search direction so that CG
//!   updates move both points together and never erode the seeded `2·s`
//!   difference.
use crate::field::{ScalarField3, Shape3, VectorField3};
use nalgebra::Vector3;

/// Two grid points joined by a slip vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstraintPair {
    /// Point that receives `+slip`, as `[i1, i2, i3]`.
    pub a: [usize; 3],
    /// Point that receives `-slip`, as `[i1, i2, i3]`.
    pub b: [usize; 3],
    pub slip: Vector3<f32>,
}

impl ConstraintPair {
    pub fn new(a: [usize; 3], b: [usize; 3], slip: Vector3<f32>) -> Self {
        Self { a, b, slip }
    }

    /// Build from fractional coordinates, rounding each to the nearest index.
    ///
    /// Negative coordinates are kept as-is so that validation in
    /// [`ConstraintSet::push`] can report them.
    pub fn from_coords(
        a: [f32; 3],
        b: [f32; 3],
        slip: Vector3<f32>,
    ) -> Result<Self, ConstraintError> {
        let ra = a.map(|x| x.round() as i64);
        let rb = b.map(|x| x.round() as i64);
        let to_index = |p: [i64; 3]| -> Option<[usize; 3]> {
            if p.iter().all(|&k| k >= 0) {
                Some(p.map(|k| k as usize))
            } else {
                None
            }
        };
        match (to_index(ra), to_index(rb)) {
            (Some(a), Some(b)) => Ok(Self { a, b, slip }),
            (None, _) => Err(ConstraintError::NegativeCoordinate { point: ra }),
            (_, None) => Err(ConstraintError::NegativeCoordinate { point: rb }),
        }
    }
}

/// Reasons a constraint cannot be placed on a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintError {
    OutOfGrid {
        pair: usize,
        point: [usize; 3],
        shape: Shape3,
    },
    CoincidentPoints {
        pair: usize,
        point: [usize; 3],
    },
    NegativeCoordinate {
        point: [i64; 3],
    },
}

impl std::fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintError::OutOfGrid { pair, point, shape } => write!(
                f,
                "constraint {pair}: point {point:?} lies outside grid {shape}"
            ),
            ConstraintError::CoincidentPoints { pair, point } => write!(
                f,
                "constraint {pair}: both ends at {point:?}"
            ),
            ConstraintError::NegativeCoordinate { point } => {
                write!(f, "constraint point {point:?} has a negative coordinate")
            }
        }
    }
}

impl std::error::Error for ConstraintError {}

/// Ordered, validated constraint pairs bound to one grid.
#[derive(Clone, Debug)]
pub struct ConstraintSet {
    shape: Shape3,
    pairs: Vec<ConstraintPair>,
}

impl ConstraintSet {
    /// Empty set for grid `shape`.
    pub fn new(shape: Shape3) -> Self {
        Self {
            shape,
            pairs: Vec::new(),
        }
    }

    pub fn from_pairs(
        shape: Shape3,
        pairs: impl IntoIterator<Item = ConstraintPair>,
    ) -> Result<Self, ConstraintError> {
        let mut set = Self::new(shape);
        for pair in pairs {
            set.push(pair)?;
        }
        Ok(set)
    }

    /// Append a pair after checking both points are in the grid and distinct.
    pub fn push(&mut self, pair: ConstraintPair) -> Result<(), ConstraintError> {
        let index = self.pairs.len();
        for point in [pair.a, pair.b] {
            let [k1, k2, k3] = point;
            if k1 >= self.shape.n1 || k2 >= self.shape.n2 || k3 >= self.shape.n3 {
                return Err(ConstraintError::OutOfGrid {
                    pair: index,
                    point,
                    shape: self.shape,
                });
            }
        }
        if pair.a == pair.b {
            return Err(ConstraintError::CoincidentPoints {
                pair: index,
                point: pair.a,
            });
        }
        self.pairs.push(pair);
        Ok(())
    }

    pub fn shape(&self) -> Shape3 {
        self.shape
    }

    pub fn pairs(&self) -> &[ConstraintPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Initial iterate: `+s` at A, `-s` at B, zero elsewhere. Later pairs
    /// overwrite earlier ones at shared points.
    pub fn seed(&self) -> VectorField3 {
        let mut r = VectorField3::new(self.shape);
        for pair in &self.pairs {
            r.set(pair.a[0], pair.a[1], pair.a[2], pair.slip);
            r.set(pair.b[0], pair.b[1], pair.b[2], -pair.slip);
        }
        r
    }

    /// Replace the values at both ends of every pair by their mean.
    pub fn project(&self, x: &mut ScalarField3) {
        assert_eq!(x.shape(), self.shape, "constraint grid mismatch");
        let data = x.as_mut_slice();
        for pair in &self.pairs {
            let ia = self.shape.idx(pair.a[0], pair.a[1], pair.a[2]);
            let ib = self.shape.idx(pair.b[0], pair.b[1], pair.b[2]);
            let avg = 0.5 * (data[ia] + data[ib]);
            data[ia] = avg;
            data[ib] = avg;
        }
    }

    /// [`ConstraintSet::project`] on each component.
    pub fn project_vector(&self, v: &mut VectorField3) {
        for c in v.components_mut() {
            self.project(c);
        }
    }
}
