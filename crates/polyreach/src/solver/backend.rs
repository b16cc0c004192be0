//! `minilp` adapter.
//!
//! Every column is a free variable. Each bound pair becomes one `Eq` row when
//! tight, otherwise one `Le` row for a finite upper side and one `Ge` row for a
//! finite lower side. `minilp` runs its revised simplex to completion, so
//! `max_iter` is not forwarded; the solution is checked against the pairs
//! afterwards and a residual above `eps_abs + eps_rel * scale` downgrades the
//! status to `SolvedInaccurate`.

use minilp::{ComparisonOp, OptimizationDirection, Variable};
use nalgebra::DVector;

use super::{Problem, Solution, Solver, Status};
use crate::cfg::SolverSettings;

/// Default LP adapter, backed by `minilp`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinilpSolver;

impl MinilpSolver {
    fn build(pb: &Problem) -> (minilp::Problem, Vec<Variable>) {
        let mut lp = minilp::Problem::new(OptimizationDirection::Minimize);
        let vars: Vec<Variable> = pb
            .q
            .iter()
            .map(|&c| lp.add_var(c, (f64::NEG_INFINITY, f64::INFINITY)))
            .collect();
        for (i, row) in pb.p.row_iter().enumerate() {
            let terms: Vec<(Variable, f64)> = vars
                .iter()
                .zip(row.iter())
                .filter(|(_, c)| **c != 0.0)
                .map(|(v, c)| (*v, *c))
                .collect();
            let (lo, hi) = (pb.l[i], pb.u[i]);
            if lo == hi {
                lp.add_constraint(terms.as_slice(), ComparisonOp::Eq, hi);
                continue;
            }
            if hi.is_finite() {
                lp.add_constraint(terms.as_slice(), ComparisonOp::Le, hi);
            }
            if lo.is_finite() {
                lp.add_constraint(terms.as_slice(), ComparisonOp::Ge, lo);
            }
        }
        (lp, vars)
    }

    /// Largest violation of `l <= P x <= u` and the magnitude it is measured against.
    fn residual(pb: &Problem, x: &DVector<f64>) -> (f64, f64) {
        let px = &pb.p * x;
        let mut worst: f64 = 0.0;
        let mut scale: f64 = 0.0;
        for i in 0..px.len() {
            if pb.u[i].is_finite() {
                worst = worst.max(px[i] - pb.u[i]);
                scale = scale.max(pb.u[i].abs());
            }
            if pb.l[i].is_finite() {
                worst = worst.max(pb.l[i] - px[i]);
                scale = scale.max(pb.l[i].abs());
            }
        }
        (worst, scale)
    }
}

impl Solver for MinilpSolver {
    fn solve(&self, pb: &Problem, settings: &SolverSettings) -> Solution {
        let n = pb.dim();
        if (0..pb.p.nrows()).any(|i| pb.l[i] > pb.u[i]) {
            return Solution::failed(Status::PrimalInfeasible, n);
        }
        let (lp, vars) = Self::build(pb);
        let sol = match lp.solve() {
            Ok(sol) => sol,
            Err(minilp::Error::Infeasible) => return Solution::failed(Status::PrimalInfeasible, n),
            Err(minilp::Error::Unbounded) => return Solution::failed(Status::DualInfeasible, n),
        };
        let x = DVector::from_iterator(n, vars.iter().map(|v| sol[*v]));
        let (resid, scale) = Self::residual(pb, &x);
        let status = if resid > settings.eps_abs + settings.eps_rel * scale {
            Status::SolvedInaccurate
        } else {
            Status::Solved
        };
        if settings.verbose {
            tracing::debug!(rows = pb.p.nrows(), cols = n, resid, obj_val = sol.objective(), "lp finished");
        }
        Solution {
            status,
            obj_val: sol.objective(),
            x,
        }
    }
}
