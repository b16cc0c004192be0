//! Canonical bound-pair form `(P, lb, ub)`: `lb <= P x <= ub`.
//!
//! This is the form handed to the LP adapter. Mirrored inequality rows fold
//! into one two-sided bound; unmatched rows get an infinite opposite side;
//! equality rows become tight pairs.

use nalgebra::{DMatrix, DVector, RowDVector};

use crate::engine::Engine;
use crate::error::{PolyError, Result};
use crate::solver::Problem;

/// `lb <= P x <= ub`, possibly collapsed to the origin singleton.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundPairs {
    pub p: DMatrix<f64>,
    pub lb: DVector<f64>,
    pub ub: DVector<f64>,
    /// Set when the emptiness proxy replaced the pairs by `I x = 0`.
    pub collapsed: bool,
}

impl BoundPairs {
    /// Fold `A x <= b, Ae x = be` into bound pairs, then check and collapse.
    pub(crate) fn from_hrep(
        name: &str,
        a: &DMatrix<f64>,
        b: &DVector<f64>,
        ae: &DMatrix<f64>,
        be: &DVector<f64>,
        eng: &Engine,
    ) -> Result<Self> {
        let pairs = Self::paired(name, a, b, ae, be)?;
        Self::checked(name, pairs.p, pairs.lb, pairs.ub, eng)
    }

    /// Fold only: no feasibility LP and no emptiness collapse. For transient
    /// systems whose feasibility is already known, such as the relaxed
    /// systems of a redundancy test.
    pub(crate) fn paired(
        name: &str,
        a: &DMatrix<f64>,
        b: &DVector<f64>,
        ae: &DMatrix<f64>,
        be: &DVector<f64>,
    ) -> Result<Self> {
        let n = a.ncols();
        let mut p: Vec<RowDVector<f64>> = Vec::with_capacity(a.nrows() + ae.nrows());
        let mut lb = Vec::with_capacity(p.capacity());
        let mut ub = Vec::with_capacity(p.capacity());

        let mut remaining: Vec<usize> = (0..a.nrows()).collect();
        while !remaining.is_empty() {
            let i = remaining.remove(0);
            let row = a.row(i);
            let Some(lead) = row.iter().copied().find(|v| *v != 0.0) else {
                // 0 <= b_i
                if b[i] < 0.0 {
                    return Err(PolyError::Infeasible {
                        name: name.to_string(),
                        detail: format!("zero row {i} requires 0 <= {}", b[i]),
                        rows: vec![(i, 0.0, b[i])],
                        lb,
                        ub,
                    });
                }
                continue;
            };
            let mirror = remaining
                .iter()
                .position(|&j| (0..n).all(|c| a[(j, c)] == -a[(i, c)]));
            let positive = lead > 0.0;
            let oriented = if positive { row.into_owned() } else { -row };
            match mirror.map(|pos| remaining.remove(pos)) {
                Some(j) => {
                    let (hi, lo) = if positive { (b[i], -b[j]) } else { (b[j], -b[i]) };
                    p.push(oriented);
                    ub.push(hi);
                    lb.push(lo);
                }
                None if positive => {
                    p.push(oriented);
                    ub.push(b[i]);
                    lb.push(f64::NEG_INFINITY);
                }
                None => {
                    p.push(oriented);
                    ub.push(f64::INFINITY);
                    lb.push(-b[i]);
                }
            }
        }
        for i in 0..ae.nrows() {
            p.push(ae.row(i).into_owned());
            lb.push(be[i]);
            ub.push(be[i]);
        }

        let p = if p.is_empty() {
            DMatrix::zeros(0, n)
        } else {
            DMatrix::from_rows(&p)
        };
        Ok(Self {
            p,
            lb: DVector::from_vec(lb),
            ub: DVector::from_vec(ub),
            collapsed: false,
        })
    }

    /// Validate `lb <= ub`, solve the feasibility LP, and apply the emptiness proxy.
    pub(crate) fn checked(
        name: &str,
        p: DMatrix<f64>,
        lb: DVector<f64>,
        ub: DVector<f64>,
        eng: &Engine,
    ) -> Result<Self> {
        let n = p.ncols();
        let offending: Vec<(usize, f64, f64)> = (0..lb.len())
            .filter(|&i| lb[i] > ub[i])
            .map(|i| (i, lb[i], ub[i]))
            .collect();
        if !offending.is_empty() {
            return Err(PolyError::Infeasible {
                name: name.to_string(),
                detail: "lower bound exceeds upper bound".to_string(),
                rows: offending,
                lb: lb.iter().copied().collect(),
                ub: ub.iter().copied().collect(),
            });
        }

        let feasibility = Problem::feasibility(p.clone(), lb.clone(), ub.clone())?;
        let sol = eng.solver.solve(&feasibility, &eng.tol.feasibility);
        if !sol.status.is_accepted() {
            return Err(PolyError::Infeasible {
                name: name.to_string(),
                detail: format!("feasibility LP returned {}", sol.status),
                rows: Vec::new(),
                lb: lb.iter().copied().collect(),
                ub: ub.iter().copied().collect(),
            });
        }

        if is_empty_proxy(&lb, &ub, eng.tol.empty) {
            tracing::debug!(name, "bounds collapse to the origin");
            return Ok(Self {
                p: DMatrix::identity(n, n),
                lb: DVector::zeros(n),
                ub: DVector::zeros(n),
                collapsed: true,
            });
        }
        Ok(Self {
            p,
            lb,
            ub,
            collapsed: false,
        })
    }

    /// LP `minimize q·x` over these bounds.
    pub fn problem(&self, q: DVector<f64>) -> Result<Problem> {
        Problem::new(q, self.p.clone(), self.lb.clone(), self.ub.clone())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lb.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lb.is_empty()
    }
}

/// Loose emptiness proxy: every lower bound above `-eps` and every upper bound
/// below `eps`. An empty list of pairs is never "empty" (it is all of R^n).
pub fn is_empty_proxy(lb: &DVector<f64>, ub: &DVector<f64>, eps: f64) -> bool {
    if lb.is_empty() || ub.is_empty() {
        return false;
    }
    lb.min() > -eps && ub.max() < eps
}
