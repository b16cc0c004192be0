//! LP adapter seam.
//!
//! Problems come in box-constrained-affine form, the same form the bound-pair
//! representation of a `Polyhedron` produces:
//!
//! ```text
//! minimize    q·x
//! subject to  l <= P x <= u      (entries of l, u may be infinite)
//! ```
//!
//! Callers only accept `Solved` and `SolvedInaccurate`; anything else is fatal
//! at the call site, which attaches its own context. `MaxIterReached` exists
//! for backends that cap iterations; the bundled `minilp` adapter never
//! returns it.

mod backend;

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::cfg::SolverSettings;
use crate::error::{PolyError, Result};

pub use backend::MinilpSolver;

/// Outcome class of a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Solved,
    SolvedInaccurate,
    PrimalInfeasible,
    DualInfeasible,
    MaxIterReached,
}

impl Status {
    #[inline]
    pub fn is_accepted(self) -> bool {
        matches!(self, Status::Solved | Status::SolvedInaccurate)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Solved => "solved",
            Status::SolvedInaccurate => "solved inaccurate",
            Status::PrimalInfeasible => "primal infeasible",
            Status::DualInfeasible => "dual infeasible (unbounded)",
            Status::MaxIterReached => "maximum iterations reached",
        };
        f.write_str(s)
    }
}

/// `minimize q·x s.t. l <= P x <= u`.
#[derive(Clone, Debug)]
pub struct Problem {
    pub q: DVector<f64>,
    pub p: DMatrix<f64>,
    pub l: DVector<f64>,
    pub u: DVector<f64>,
}

impl Problem {
    pub fn new(q: DVector<f64>, p: DMatrix<f64>, l: DVector<f64>, u: DVector<f64>) -> Result<Self> {
        if q.len() != p.ncols() {
            return Err(PolyError::malformed(format!(
                "cost has {} entries, constraint matrix is {}x{}",
                q.len(),
                p.nrows(),
                p.ncols()
            )));
        }
        if l.len() != p.nrows() || u.len() != p.nrows() {
            return Err(PolyError::malformed(format!(
                "bounds have {} and {} entries, constraint matrix has {} rows",
                l.len(),
                u.len(),
                p.nrows()
            )));
        }
        Ok(Self { q, p, l, u })
    }

    /// Zero objective: any point with `l <= P x <= u` is optimal.
    pub fn feasibility(p: DMatrix<f64>, l: DVector<f64>, u: DVector<f64>) -> Result<Self> {
        let q = DVector::zeros(p.ncols());
        Self::new(q, p, l, u)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.q.len()
    }
}

/// Result of a solve. `x` and `obj_val` are meaningful only for accepted statuses.
#[derive(Clone, Debug)]
pub struct Solution {
    pub status: Status,
    pub obj_val: f64,
    pub x: DVector<f64>,
}

impl Solution {
    pub(crate) fn failed(status: Status, dim: usize) -> Self {
        Self {
            status,
            obj_val: f64::NAN,
            x: DVector::zeros(dim),
        }
    }
}

/// Any LP backend usable by the polyhedral operations.
pub trait Solver {
    fn solve(&self, problem: &Problem, settings: &SolverSettings) -> Solution;
}
