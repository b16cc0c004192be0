//! Convex polyhedra `{x : A x <= b, Ae x = be}` and their set algebra.
//!
//! Purpose
//! - One immutable H-rep type with a lazily computed V-rep cache, plus the
//!   operations robust constraint tightening needs: redundancy elimination,
//!   affine image/preimage, Pontryagin difference, intersection, containment.
//!
//! Why this design (short)
//! - Every operation returns a new instance, so the generator cache can never
//!   describe a different system than the one it was computed from.
//! - The bound-pair form `(P, lb, ub)` is built once per instance; each LP the
//!   operations issue is posed on it.
//! - Numerical backends and thresholds arrive through `Engine`; nothing here
//!   hard-codes an epsilon.
//!
//! Conventions
//! - Inequalities are `a·x <= b` with no normalisation of `a`.
//! - `A, b` (and `lb, ub` in `from_bounds`) entries below `tol.snap` are
//!   snapped to zero on construction.
//! - Equality rows default to an empty `0 x n` system.

mod bounds;
mod minrep;
mod ops;

use std::cell::OnceCell;

use nalgebra::{DMatrix, DVector};

use crate::engine::Engine;
use crate::enumerate::{Generators, Inequalities};
use crate::error::{PolyError, Result};

pub use bounds::{is_empty_proxy, BoundPairs};

const DEFAULT_NAME: &str = "Set";

/// Zero every entry below `snap` in magnitude. Infinite entries pass through.
fn snap_small<R: nalgebra::Dim, C: nalgebra::Dim, S>(m: &mut nalgebra::Matrix<f64, R, C, S>, snap: f64)
where
    S: nalgebra::StorageMut<f64, R, C>,
{
    m.apply(|v| {
        if v.abs() < snap {
            *v = 0.0
        }
    });
}

/// Convex polyhedron in H-representation.
///
/// Invariants:
/// - `b.len() == a.nrows()`, `be.len() == ae.nrows()`, all column counts equal `dim`.
/// - `bounds` is the bound-pair form of exactly this system.
/// - `vrep`, once filled, is the generator set of exactly this system.
#[derive(Clone, Debug)]
pub struct Polyhedron {
    name: String,
    dim: usize,
    a: DMatrix<f64>,
    b: DVector<f64>,
    ae: DMatrix<f64>,
    be: DVector<f64>,
    bounds: BoundPairs,
    vrep: OnceCell<Generators>,
}

impl Polyhedron {
    /// `{x : A x <= b}`.
    pub fn from_hrep(a: DMatrix<f64>, b: DVector<f64>, eng: &Engine) -> Result<Self> {
        let n = a.ncols();
        Self::build(DEFAULT_NAME, a, b, DMatrix::zeros(0, n), DVector::zeros(0), eng)
    }

    /// `{x : A x <= b, Ae x = be}`.
    pub fn from_hrep_eq(
        a: DMatrix<f64>,
        b: DVector<f64>,
        ae: DMatrix<f64>,
        be: DVector<f64>,
        eng: &Engine,
    ) -> Result<Self> {
        Self::build(DEFAULT_NAME, a, b, ae, be, eng)
    }

    /// `{x : lb <= A x <= ub}`; infinite bounds contribute no inequality row.
    pub fn from_bounds(
        mut a: DMatrix<f64>,
        mut lb: DVector<f64>,
        mut ub: DVector<f64>,
        eng: &Engine,
    ) -> Result<Self> {
        let n = a.ncols();
        if n == 0 {
            return Err(PolyError::malformed("polyhedron must have at least one column"));
        }
        if lb.len() != a.nrows() || ub.len() != a.nrows() {
            return Err(PolyError::malformed(format!(
                "bounds have {} and {} entries, A is {}x{}",
                lb.len(),
                ub.len(),
                a.nrows(),
                n
            )));
        }
        snap_small(&mut a, eng.tol.snap);
        snap_small(&mut lb, eng.tol.snap);
        snap_small(&mut ub, eng.tol.snap);
        let bounds = BoundPairs::checked(DEFAULT_NAME, a.clone(), lb.clone(), ub.clone(), eng)?;

        let mut rows = Vec::new();
        let mut rhs = Vec::new();
        for i in 0..a.nrows() {
            if ub[i].is_finite() {
                rows.push(a.row(i).into_owned());
                rhs.push(ub[i]);
            }
        }
        for i in 0..a.nrows() {
            if lb[i].is_finite() {
                rows.push(-a.row(i));
                rhs.push(-lb[i]);
            }
        }
        let a_full = if rows.is_empty() {
            DMatrix::zeros(0, n)
        } else {
            DMatrix::from_rows(&rows)
        };
        Ok(Self {
            name: DEFAULT_NAME.to_string(),
            dim: n,
            a: a_full,
            b: DVector::from_vec(rhs),
            ae: DMatrix::zeros(0, n),
            be: DVector::zeros(0),
            bounds,
            vrep: OnceCell::new(),
        })
    }

    /// Axis-aligned box `lo <= x <= hi`.
    pub fn from_box(lo: DVector<f64>, hi: DVector<f64>, eng: &Engine) -> Result<Self> {
        let n = lo.len();
        Self::from_bounds(DMatrix::identity(n, n), lo, hi, eng)
    }

    /// Rename (diagnostic only).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub(crate) fn build(
        name: &str,
        mut a: DMatrix<f64>,
        mut b: DVector<f64>,
        ae: DMatrix<f64>,
        be: DVector<f64>,
        eng: &Engine,
    ) -> Result<Self> {
        let n = a.ncols();
        if n == 0 {
            return Err(PolyError::malformed(format!("`{name}`: A has no columns")));
        }
        if b.len() != a.nrows() {
            return Err(PolyError::malformed(format!(
                "`{name}`: b has {} entries, A is {}x{}",
                b.len(),
                a.nrows(),
                n
            )));
        }
        if ae.ncols() != n || be.len() != ae.nrows() {
            return Err(PolyError::malformed(format!(
                "`{name}`: Ae is {}x{} and be has {} entries, expected {} columns",
                ae.nrows(),
                ae.ncols(),
                be.len(),
                n
            )));
        }
        snap_small(&mut a, eng.tol.snap);
        snap_small(&mut b, eng.tol.snap);
        let bounds = BoundPairs::from_hrep(name, &a, &b, &ae, &be, eng)?;
        Ok(Self {
            name: name.to_string(),
            dim: n,
            a,
            b,
            ae,
            be,
            bounds,
            vrep: OnceCell::new(),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }
    #[inline]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }
    #[inline]
    pub fn b(&self) -> &DVector<f64> {
        &self.b
    }
    #[inline]
    pub fn ae(&self) -> &DMatrix<f64> {
        &self.ae
    }
    #[inline]
    pub fn be(&self) -> &DVector<f64> {
        &self.be
    }
    #[inline]
    pub fn bounds(&self) -> &BoundPairs {
        &self.bounds
    }
    /// Number of inequality rows.
    #[inline]
    pub fn ni(&self) -> usize {
        self.a.nrows()
    }
    /// Bound pairs were replaced by the origin singleton (emptiness proxy).
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.bounds.collapsed
    }
    #[inline]
    pub fn has_vrep(&self) -> bool {
        self.vrep.get().is_some()
    }

    /// Oracle form `[b | -A]` (equalities as linearity rows).
    pub fn inequalities(&self) -> Inequalities {
        Inequalities::from_hrep(&self.a, &self.b, &self.ae, &self.be)
    }

    /// Generators (vertices, rays, lines), computed on first use and cached.
    pub fn vertices(&self, eng: &Engine) -> Result<&Generators> {
        if let Some(g) = self.vrep.get() {
            return Ok(g);
        }
        let g = eng.enumerator.to_vertices(&self.inequalities())?;
        tracing::debug!(name = %self.name, generators = g.rows.nrows(), "computed V-representation");
        Ok(self.vrep.get_or_init(|| g))
    }

    /// `A x <= b + eps` and `|Ae x - be| <= eps`.
    pub fn contains_point(&self, x: &DVector<f64>, eps: f64) -> bool {
        if x.len() != self.dim {
            return false;
        }
        let ineq = &self.a * x - &self.b;
        let eq = &self.ae * x - &self.be;
        ineq.iter().all(|v| *v <= eps) && eq.iter().all(|v| v.abs() <= eps)
    }
}
