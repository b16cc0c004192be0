//! Redundancy elimination.
//!
//! Row `i` (`s·x <= t`) is redundant iff `max s·x` over the working rows with
//! row `i` relaxed to `s·x <= t + slack` does not exceed `t`. The working set
//! shrinks as rows are dropped, so two identical rows never both survive and
//! never both disappear.

use std::collections::VecDeque;

use nalgebra::{DMatrix, DVector, RowDVector};

use super::bounds::BoundPairs;
use super::Polyhedron;
use crate::engine::Engine;
use crate::error::{PolyError, Result};

impl Polyhedron {
    /// Same set with every redundant inequality row removed.
    pub fn minrep(&self, eng: &Engine) -> Result<Polyhedron> {
        if self.bounds.collapsed {
            return Ok(self.clone());
        }
        let m = self.ni();
        let n = self.dim;
        let tol = &eng.tol;

        let mut untested: VecDeque<usize> = (0..m).collect();
        let mut kept: Vec<usize> = Vec::with_capacity(m);
        while let Some(i) = untested.pop_front() {
            let t = self.b[i];
            let mut rows: Vec<RowDVector<f64>> = Vec::with_capacity(untested.len() + kept.len() + 1);
            let mut rhs = Vec::with_capacity(rows.capacity());
            for &j in untested.iter().chain(kept.iter()) {
                rows.push(self.a.row(j).into_owned());
                rhs.push(self.b[j]);
            }
            rows.push(self.a.row(i).into_owned());
            rhs.push(t + tol.redundancy_slack);

            // relaxing a row of a feasible system keeps it feasible
            let relaxed_a = DMatrix::from_rows(&rows);
            let relaxed_b = DVector::from_vec(rhs);
            let pairs = BoundPairs::paired(&self.name, &relaxed_a, &relaxed_b, &self.ae, &self.be)?;

            let s = self.a.row(i).transpose();
            let problem = pairs.problem(-&s)?;
            let sol = eng.solver.solve(&problem, &tol.minrep);
            if !sol.status.is_accepted() {
                return Err(PolyError::Solver {
                    context: format!("minrep of `{}`, row {i}", self.name),
                    status: sol.status,
                    detail: format!("maximize {} · x\nover rows\n{}", s.transpose(), relaxed_a),
                });
            }
            let best = -sol.obj_val;
            let keep = best > t + tol.redundancy * (1.0 + t.abs());
            tracing::debug!(name = %self.name, row = i, best, bound = t, keep, "minrep row");
            if keep {
                kept.push(i);
            }
        }
        kept.sort_unstable();

        if kept.len() != m {
            tracing::debug!(name = %self.name, before = m, after = kept.len(), "minrep dropped rows");
        }
        let a = if kept.is_empty() {
            DMatrix::zeros(0, n)
        } else {
            self.a.select_rows(&kept)
        };
        let b = self.b.select_rows(&kept);
        let out = Polyhedron::build(&self.name, a, b, self.ae.clone(), self.be.clone(), eng)?;
        // same set, so the generators stay valid
        if let Some(g) = self.vrep.get() {
            let _ = out.vrep.set(g.clone());
        }
        Ok(out)
    }
}
