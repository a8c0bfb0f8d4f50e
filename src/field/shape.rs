use serde::{Deserialize, Serialize};

/// Grid dimensions `n1 × n2 × n3`, fastest-varying dimension first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape3 {
    pub n1: usize,
    pub n2: usize,
    pub n3: usize,
}

impl Shape3 {
    pub const fn new(n1: usize, n2: usize, n3: usize) -> Self {
        Self { n1, n2, n3 }
    }

    /// Total number of grid points.
    #[inline]
    pub fn len(&self) -> usize {
        self.n1 * self.n2 * self.n3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of samples in one slice of constant `i3`.
    #[inline]
    pub fn slice_len(&self) -> usize {
        self.n1 * self.n2
    }

    /// Linear index of `(i1, i2, i3)`.
    #[inline]
    pub fn idx(&self, i1: usize, i2: usize, i3: usize) -> usize {
        debug_assert!(i1 < self.n1 && i2 < self.n2 && i3 < self.n3);
        i1 + self.n1 * (i2 + self.n2 * i3)
    }

    /// Inverse of [`Shape3::idx`].
    #[inline]
    pub fn coords(&self, idx: usize) -> [usize; 3] {
        let i1 = idx % self.n1;
        let rest = idx / self.n1;
        [i1, rest % self.n2, rest / self.n2]
    }

    /// Whether signed coordinates fall inside the grid.
    #[inline]
    pub fn contains(&self, k1: i64, k2: i64, k3: i64) -> bool {
        k1 >= 0
            && k2 >= 0
            && k3 >= 0
            && (k1 as usize) < self.n1
            && (k2 as usize) < self.n2
            && (k3 as usize) < self.n3
    }

    /// Return `Ok(())` when `other` matches, otherwise a [`ShapeMismatch`]
    /// tagged with `what`.
    pub fn check(&self, other: Shape3, what: &'static str) -> Result<(), ShapeMismatch> {
        if *self == other {
            Ok(())
        } else {
            Err(ShapeMismatch {
                what,
                expected: *self,
                found: other,
            })
        }
    }
}

impl std::fmt::Display for Shape3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}×{}", self.n1, self.n2, self.n3)
    }
}

/// Two cooperating fields disagree on the grid they are sampled on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeMismatch {
    /// Name of the offending input.
    pub what: &'static str,
    pub expected: Shape3,
    pub found: Shape3,
}

impl std::fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "shape mismatch for {}: expected {}, found {}",
            self.what, self.expected, self.found
        )
    }
}

impl std::error::Error for ShapeMismatch {}
