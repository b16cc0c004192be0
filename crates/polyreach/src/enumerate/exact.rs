//! Exact-rational enumeration by tight-set combinations.
//!
//! H→V: the lineality space of `{A x <= b, Ae x = be}` is the null space of
//! `[A; Ae]`; restricting to its orthogonal complement leaves a pointed
//! polyhedron. Vertices are the feasible unique solutions of "all equalities +
//! k tight inequalities"; extreme rays are the feasible 1-dimensional null
//! spaces of "all equalities + (k-1) tight inequalities".
//!
//! V→H: facets are the extreme rays of the dual cone
//! `{h : h·g >= 0 for vertices/rays, h·l = 0 for lines}`; its lineality space
//! gives the equality rows (affine hull). The same tight-set enumeration is
//! run on the dual side.
//!
//! Inputs are rounded to a fixed number of decimals and lifted to
//! `BigRational`, so every rank decision and dedup is exact. Complexity is
//! combinatorial (C(m, n) subsets); acceptable for the low-dimensional sets
//! this crate targets.

use std::collections::HashSet;

use nalgebra::DMatrix;
use num_traits::{One, Signed, Zero};

use super::util::{combinations, dot, normalize, nullspace, rank, solve_unique, to_f64, to_rational, Q};
use super::{Enumerator, Generators, Inequalities};
use crate::error::{PolyError, Result};

/// Default enumeration backend.
#[derive(Clone, Copy, Debug)]
pub struct ExactEnumerator {
    /// Decimals kept when lifting inequality rows.
    pub hrep_digits: u32,
    /// Decimals kept when lifting generator rows.
    pub vrep_digits: u32,
}

impl Default for ExactEnumerator {
    fn default() -> Self {
        Self {
            hrep_digits: 6,
            vrep_digits: 8,
        }
    }
}

fn lift(rows: &DMatrix<f64>, digits: u32) -> Result<Vec<Vec<Q>>> {
    let mut out = Vec::with_capacity(rows.nrows());
    for i in 0..rows.nrows() {
        let mut row = Vec::with_capacity(rows.ncols());
        for j in 0..rows.ncols() {
            let q = to_rational(rows[(i, j)], digits).ok_or_else(|| {
                PolyError::oracle(format!("non-finite entry at ({i}, {j})"), format!("{rows}"))
            })?;
            row.push(q);
        }
        out.push(row);
    }
    Ok(out)
}

fn lower(rows: &[Vec<Q>], ncols: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), ncols, |i, j| to_f64(&rows[i][j]))
}

impl Enumerator for ExactEnumerator {
    fn to_vertices(&self, ineq: &Inequalities) -> Result<Generators> {
        let n = ineq.dim();
        if ineq.rows.ncols() == 0 {
            return Err(PolyError::oracle("inequality matrix has no columns", ""));
        }
        let lifted = lift(&ineq.rows, self.hrep_digits)?;
        // split into  A x <= b  and  Ae x = be
        let mut a = Vec::new();
        let mut b = Vec::new();
        let mut eq_a = Vec::new();
        let mut eq_b = Vec::new();
        for (i, row) in lifted.into_iter().enumerate() {
            let normal: Vec<Q> = row[1..].iter().map(|v| -v.clone()).collect();
            if ineq.linearity.contains(&i) {
                eq_a.push(normal);
                eq_b.push(row[0].clone());
            } else {
                a.push(normal);
                b.push(row[0].clone());
            }
        }

        let mut all = a.clone();
        all.extend(eq_a.iter().cloned());
        let lines = nullspace(&all, n);
        for l in &lines {
            eq_a.push(l.clone());
            eq_b.push(Q::zero());
        }
        let k = n - rank(&eq_a, n);

        let feasible = |x: &[Q]| a.iter().zip(&b).all(|(ai, bi)| dot(ai, x) <= *bi);

        let mut seen = HashSet::new();
        let mut vertices = Vec::new();
        for comb in combinations(a.len(), k) {
            let mut sys = eq_a.clone();
            let mut rhs = eq_b.clone();
            for &i in &comb {
                sys.push(a[i].clone());
                rhs.push(b[i].clone());
            }
            if let Some(x) = solve_unique(&sys, &rhs, n) {
                if feasible(&x) && seen.insert(x.clone()) {
                    vertices.push(x);
                }
            }
        }
        if vertices.is_empty() {
            return Err(PolyError::oracle(
                "no vertex found (empty or inconsistent system)",
                format!("{}", ineq.rows),
            ));
        }

        let mut seen_rays = HashSet::new();
        let mut rays = Vec::new();
        if k >= 1 {
            let recedes = |d: &[Q]| a.iter().all(|ai| !dot(ai, d).is_positive());
            for comb in combinations(a.len(), k - 1) {
                let mut sys = eq_a.clone();
                for &i in &comb {
                    sys.push(a[i].clone());
                }
                let ns = nullspace(&sys, n);
                if ns.len() != 1 {
                    continue;
                }
                let mut d = ns.into_iter().next().unwrap_or_default();
                if !recedes(&d) {
                    d.iter_mut().for_each(|v| *v = -v.clone());
                    if !recedes(&d) {
                        continue;
                    }
                }
                normalize(&mut d);
                if seen_rays.insert(d.clone()) {
                    rays.push(d);
                }
            }
        }

        let mut rows = Vec::with_capacity(vertices.len() + rays.len() + lines.len());
        for v in &vertices {
            let mut r = vec![Q::one()];
            r.extend(v.iter().cloned());
            rows.push(r);
        }
        for d in rays.iter().chain(&lines) {
            let mut r = vec![Q::zero()];
            r.extend(d.iter().cloned());
            rows.push(r);
        }
        let first_line = vertices.len() + rays.len();
        Ok(Generators {
            rows: lower(&rows, n + 1),
            lines: (first_line..rows.len()).collect(),
        })
    }

    fn to_facets(&self, gens: &Generators) -> Result<Inequalities> {
        let d = gens.rows.ncols();
        let lifted = lift(&gens.rows, self.vrep_digits)?;
        let mut g = Vec::new();
        let mut l = Vec::new();
        for (i, row) in lifted.into_iter().enumerate() {
            if gens.lines.contains(&i) {
                l.push(row);
            } else {
                g.push(row);
            }
        }
        if d == 0 || !g.iter().any(|row| !row[0].is_zero()) {
            return Err(PolyError::oracle(
                "generator matrix has no vertex",
                format!("{}", gens.rows),
            ));
        }

        let mut all = g.clone();
        all.extend(l.iter().cloned());
        let mut hlin = nullspace(&all, d);
        hlin.iter_mut().for_each(|h| normalize(h));
        let mut base = l.clone();
        base.extend(hlin.iter().cloned());
        let k = (d - 1).saturating_sub(rank(&base, d));

        let mut seen = HashSet::new();
        let mut facets = Vec::new();
        for comb in combinations(g.len(), k) {
            let mut sys = base.clone();
            for &i in &comb {
                sys.push(g[i].clone());
            }
            let ns = nullspace(&sys, d);
            if ns.len() != 1 {
                continue;
            }
            let mut h = ns.into_iter().next().unwrap_or_default();
            let supports = |h: &[Q]| g.iter().all(|gi| !dot(gi, h).is_negative());
            if !supports(&h) {
                h.iter_mut().for_each(|v| *v = -v.clone());
                if !supports(&h) {
                    continue;
                }
            }
            // `1 >= 0` style rows carry no information
            if h[1..].iter().all(|v| v.is_zero()) {
                continue;
            }
            normalize(&mut h);
            if seen.insert(h.clone()) {
                facets.push(h);
            }
        }

        let first_lin = facets.len();
        let mut rows = facets;
        rows.extend(hlin);
        Ok(Inequalities {
            rows: lower(&rows, d),
            linearity: (first_lin..rows.len()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{dmatrix, dvector, DVector};

    fn unit_square() -> Inequalities {
        // 0 <= x <= 1, 0 <= y <= 1 as [b | -A]
        Inequalities {
            rows: dmatrix![
                1.0, -1.0, 0.0;
                0.0, 1.0, 0.0;
                1.0, 0.0, -1.0;
                0.0, 0.0, 1.0
            ],
            linearity: vec![],
        }
    }

    fn has_point(points: &[DVector<f64>], p: &DVector<f64>) -> bool {
        points.iter().any(|q| (q - p).norm() < 1e-12)
    }

    #[test]
    fn square_has_four_vertices() {
        let g = ExactEnumerator::default().to_vertices(&unit_square()).unwrap();
        let verts: Vec<_> = g.vertices().collect();
        assert_eq!(verts.len(), 4);
        assert_eq!(g.rays().count(), 0);
        assert!(g.lines.is_empty());
        for p in [dvector![0.0, 0.0], dvector![1.0, 0.0], dvector![0.0, 1.0], dvector![1.0, 1.0]] {
            assert!(has_point(&verts, &p));
        }
    }

    #[test]
    fn quadrant_has_vertex_and_two_rays() {
        // x >= 0, y >= 0
        let ineq = Inequalities {
            rows: dmatrix![0.0, 1.0, 0.0; 0.0, 0.0, 1.0],
            linearity: vec![],
        };
        let g = ExactEnumerator::default().to_vertices(&ineq).unwrap();
        assert_eq!(g.vertices().count(), 1);
        let rays: Vec<_> = g.rays().collect();
        assert_eq!(rays.len(), 2);
        assert!(has_point(&rays, &dvector![1.0, 0.0]));
        assert!(has_point(&rays, &dvector![0.0, 1.0]));
    }

    #[test]
    fn slab_reports_a_line() {
        // -1 <= x <= 1, y free
        let ineq = Inequalities {
            rows: dmatrix![1.0, -1.0, 0.0; 1.0, 1.0, 0.0],
            linearity: vec![],
        };
        let g = ExactEnumerator::default().to_vertices(&ineq).unwrap();
        assert_eq!(g.vertices().count(), 2);
        assert_eq!(g.lines.len(), 1);
        let l = g.line_directions().next().unwrap();
        assert!(l[0].abs() < 1e-12 && l[1].abs() > 0.0);
    }

    #[test]
    fn square_round_trips_through_facets() {
        let e = ExactEnumerator::default();
        let g = e.to_vertices(&unit_square()).unwrap();
        let h = e.to_facets(&g).unwrap();
        assert!(h.linearity.is_empty());
        assert_eq!(h.rows.nrows(), 4);
        let (a, b) = h.to_hrep();
        // every input vertex satisfies the recovered system, the centre is strict
        for v in g.vertices() {
            assert!((&a * &v - &b).max() <= 1e-12);
        }
        let centre = dvector![0.5, 0.5];
        assert!((&a * &centre - &b).max() < 0.0);
    }

    #[test]
    fn segment_in_plane_gets_equality_row() {
        let g = Generators::from_vertices(&[dvector![0.1, 0.0], dvector![-0.1, 0.0]]);
        let h = ExactEnumerator::default().to_facets(&g).unwrap();
        assert_eq!(h.linearity.len(), 1);
        let (a, b) = h.to_hrep();
        // two facets + equality materialised twice
        assert_eq!(a.nrows(), 4);
        for (p, inside) in [
            (dvector![0.05, 0.0], true),
            (dvector![0.0, 0.01], false),
            (dvector![0.2, 0.0], false),
        ] {
            let ok = (&a * &p - &b).max() <= 1e-12;
            assert_eq!(ok, inside, "point {p:?}");
        }
    }

    #[test]
    fn empty_system_is_an_oracle_error() {
        // x <= -1 and x >= 1
        let ineq = Inequalities {
            rows: dmatrix![-1.0, -1.0; -1.0, 1.0],
            linearity: vec![],
        };
        let err = ExactEnumerator::default().to_vertices(&ineq).unwrap_err();
        assert!(matches!(err, PolyError::Oracle { .. }));
    }
}
