//! H↔V conversion seam (vertex/facet enumeration).
//!
//! Matrix conventions follow the double-description literature:
//! - `Inequalities.rows` are `[b | -A]`, i.e. each row `h` encodes
//!   `h₀ + h₁..·x >= 0`; rows listed in `linearity` hold with equality.
//! - `Generators.rows` are `[1 | v]` for vertices and `[0 | r]` for rays;
//!   rows listed in `lines` are lines (both `r` and `-r` are recession
//!   directions).
//!
//! The crate ships `ExactEnumerator`; any other backend plugs in through the
//! `Enumerator` trait.

mod exact;
pub(crate) mod util;

use nalgebra::{DMatrix, DVector, RowDVector};

use crate::error::Result;

pub use exact::ExactEnumerator;

/// Inequality description `[b | -A]` with equality rows flagged.
#[derive(Clone, Debug, PartialEq)]
pub struct Inequalities {
    pub rows: DMatrix<f64>,
    pub linearity: Vec<usize>,
}

impl Inequalities {
    /// Pack `A x <= b, Ae x = be` into oracle form.
    pub fn from_hrep(a: &DMatrix<f64>, b: &DVector<f64>, ae: &DMatrix<f64>, be: &DVector<f64>) -> Self {
        let n = a.ncols();
        let m = a.nrows();
        let me = ae.nrows();
        let mut rows = DMatrix::zeros(m + me, n + 1);
        for i in 0..m {
            rows[(i, 0)] = b[i];
            for j in 0..n {
                rows[(i, j + 1)] = -a[(i, j)];
            }
        }
        for i in 0..me {
            rows[(m + i, 0)] = be[i];
            for j in 0..n {
                rows[(m + i, j + 1)] = -ae[(i, j)];
            }
        }
        Self {
            rows,
            linearity: (m..m + me).collect(),
        }
    }

    /// Ambient dimension `n`.
    #[inline]
    pub fn dim(&self) -> usize {
        self.rows.ncols().saturating_sub(1)
    }

    /// Unpack into `(A, b)`; every linearity row also contributes its negation.
    pub fn to_hrep(&self) -> (DMatrix<f64>, DVector<f64>) {
        let n = self.dim();
        let total = self.rows.nrows() + self.linearity.len();
        let mut a = DMatrix::zeros(total, n);
        let mut b = DVector::zeros(total);
        for i in 0..self.rows.nrows() {
            b[i] = self.rows[(i, 0)];
            for j in 0..n {
                a[(i, j)] = -self.rows[(i, j + 1)];
            }
        }
        for (k, &i) in self.linearity.iter().enumerate() {
            let r = self.rows.nrows() + k;
            b[r] = -self.rows[(i, 0)];
            for j in 0..n {
                a[(r, j)] = self.rows[(i, j + 1)];
            }
        }
        (a, b)
    }
}

/// Vertex/ray/line description.
#[derive(Clone, Debug, PartialEq)]
pub struct Generators {
    pub rows: DMatrix<f64>,
    pub lines: Vec<usize>,
}

impl Generators {
    /// Ambient dimension `n`.
    #[inline]
    pub fn dim(&self) -> usize {
        self.rows.ncols().saturating_sub(1)
    }

    #[inline]
    pub fn is_vertex(&self, i: usize) -> bool {
        self.rows[(i, 0)] != 0.0
    }

    /// Coordinates of generator `i` (without the leading type column).
    pub fn point(&self, i: usize) -> DVector<f64> {
        DVector::from_fn(self.dim(), |j, _| self.rows[(i, j + 1)])
    }

    pub fn vertices(&self) -> impl Iterator<Item = DVector<f64>> + '_ {
        (0..self.rows.nrows())
            .filter(|&i| self.is_vertex(i))
            .map(|i| self.point(i))
    }

    /// Rays that are not lines.
    pub fn rays(&self) -> impl Iterator<Item = DVector<f64>> + '_ {
        (0..self.rows.nrows())
            .filter(|&i| !self.is_vertex(i) && !self.lines.contains(&i))
            .map(|i| self.point(i))
    }

    pub fn line_directions(&self) -> impl Iterator<Item = DVector<f64>> + '_ {
        self.lines.iter().map(|&i| self.point(i))
    }

    /// Build from explicit vertex list (no rays, no lines).
    pub fn from_vertices(vertices: &[DVector<f64>]) -> Self {
        let n = vertices.first().map_or(0, |v| v.len());
        let rows: Vec<RowDVector<f64>> = vertices
            .iter()
            .map(|v| RowDVector::from_fn(n + 1, |_, j| if j == 0 { 1.0 } else { v[j - 1] }))
            .collect();
        let rows = if rows.is_empty() {
            DMatrix::zeros(0, n + 1)
        } else {
            DMatrix::from_rows(&rows)
        };
        Self {
            rows,
            lines: Vec::new(),
        }
    }
}

/// Any vertex/facet enumeration backend.
pub trait Enumerator {
    /// H→V.
    fn to_vertices(&self, ineq: &Inequalities) -> Result<Generators>;
    /// V→H.
    fn to_facets(&self, gens: &Generators) -> Result<Inequalities>;
}
