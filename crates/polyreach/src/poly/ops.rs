//! Set algebra: affine image and preimage, Pontryagin difference, support
//! function, intersection, containment.

use nalgebra::{DMatrix, DVector};

use super::Polyhedron;
use crate::cfg::round_to;
use crate::engine::Engine;
use crate::enumerate::Generators;
use crate::error::{PolyError, Result};
use crate::solver::Status;

impl Polyhedron {
    /// Image `{M x : x in self}`, keeping the operand's name.
    pub fn affine_map(&self, m: &DMatrix<f64>, eng: &Engine) -> Result<Polyhedron> {
        self.affine_map_named(m, &self.name, eng)
    }

    /// Image `{M x : x in self}` named `name`.
    ///
    /// Invertible square maps transform the H-rep directly (`A M⁻¹`). Every
    /// other map goes through the generators: map them, then re-enumerate
    /// facets.
    pub fn affine_map_named(&self, m: &DMatrix<f64>, name: &str, eng: &Engine) -> Result<Polyhedron> {
        let tol = &eng.tol;
        if m.norm() <= tol.map_zero {
            return Err(PolyError::Degenerate {
                name: self.name.clone(),
                detail: format!("map has Frobenius norm {:e}", m.norm()),
                matrix: format!("{m}"),
            });
        }
        if m.ncols() != self.dim {
            return Err(PolyError::MapDimension {
                name: self.name.clone(),
                dim: self.dim,
                rows: m.nrows(),
                cols: m.ncols(),
            });
        }

        if m.is_square() && m.determinant().abs() > tol.det {
            if let Some(inv) = m.clone().try_inverse() {
                let a = &self.a * &inv;
                let ae = &self.ae * &inv;
                return Polyhedron::build(name, a, self.b.clone(), ae, self.be.clone(), eng);
            }
        }

        let gens = self.vertices(eng)?;
        let image = map_generators(gens, m, tol.map_entry, tol.map_digits, tol.product_digits);
        let coords = image.rows.columns(1, image.dim());
        if coords.iter().all(|v| v.abs() < tol.image_zero) {
            return Err(PolyError::Degenerate {
                name: self.name.clone(),
                detail: format!("image under the map is numerically zero (below {:e})", tol.image_zero),
                matrix: format!("{m}"),
            });
        }
        let (a, b) = eng.enumerator.to_facets(&image)?.to_hrep();
        Polyhedron::build(name, a, b, DMatrix::zeros(0, m.nrows()), DVector::zeros(0), eng)
    }

    /// Preimage `{x : M x in self}`.
    pub fn pre(&self, m: &DMatrix<f64>, eng: &Engine) -> Result<Polyhedron> {
        if m.nrows() != self.dim {
            return Err(PolyError::malformed(format!(
                "preimage of `{}` needs a map with {} rows, got {}x{}",
                self.name,
                self.dim,
                m.nrows(),
                m.ncols()
            )));
        }
        let digits = eng.tol.map_digits;
        let a = (&self.a * m).map(|v| round_to(v, digits));
        let ae = (&self.ae * m).map(|v| round_to(v, digits));
        Polyhedron::build(&self.name, a, self.b.clone(), ae, self.be.clone(), eng)
    }

    /// `max d·z` over `self`.
    pub fn support(&self, d: &DVector<f64>, eng: &Engine) -> Result<f64> {
        self.support_in(d, || format!("support of `{}`", self.name), eng)
    }

    fn support_in(&self, d: &DVector<f64>, context: impl FnOnce() -> String, eng: &Engine) -> Result<f64> {
        if d.len() != self.dim {
            return Err(PolyError::malformed(format!(
                "direction has {} entries, `{}` lives in R^{}",
                d.len(),
                self.name,
                self.dim
            )));
        }
        let problem = self.bounds.problem(-d)?;
        let sol = eng.solver.solve(&problem, &eng.tol.support);
        match sol.status {
            Status::Solved => Ok(-sol.obj_val),
            Status::SolvedInaccurate => {
                tracing::warn!(name = %self.name, obj_val = sol.obj_val, "support value solved inaccurately");
                Ok(-sol.obj_val)
            }
            status => Err(PolyError::Solver {
                context: context(),
                status,
                detail: format!("maximize {} · z over\n{}", d.transpose(), self),
            }),
        }
    }

    /// `self ⊖ q`, keeping the operand's name.
    pub fn pontryagin_difference(&self, q: &Polyhedron, eng: &Engine) -> Result<Polyhedron> {
        self.pontryagin_difference_named(q, &self.name, eng)
    }

    /// `{x : x + z in self for all z in q}` named `name`.
    pub fn pontryagin_difference_named(&self, q: &Polyhedron, name: &str, eng: &Engine) -> Result<Polyhedron> {
        if q.dim != self.dim {
            return Err(PolyError::malformed(format!(
                "Pontryagin difference of `{}` (R^{}) and `{}` (R^{})",
                self.name, self.dim, q.name, q.dim
            )));
        }
        let mut b = self.b.clone();
        for i in 0..self.ni() {
            let d = self.a.row(i).transpose();
            let h = q.support_in(&d, || format!("`{}` ⊖ `{}`, row {i}", self.name, q.name), eng)?;
            b[i] -= h;
        }

        let mut be = self.be.clone();
        for i in 0..self.ae.nrows() {
            let d = self.ae.row(i).transpose();
            let ctx = || format!("`{}` ⊖ `{}`, equality row {i}", self.name, q.name);
            let hi = q.support_in(&d, ctx, eng)?;
            let lo = -q.support_in(&-&d, ctx, eng)?;
            if hi - lo > eng.tol.empty {
                return Err(PolyError::Infeasible {
                    name: name.to_string(),
                    detail: format!("`{}` has extent {:e} along equality row {i}", q.name, hi - lo),
                    rows: vec![(i, lo, hi)],
                    lb: Vec::new(),
                    ub: Vec::new(),
                });
            }
            be[i] -= hi;
        }
        Polyhedron::build(name, self.a.clone(), b, self.ae.clone(), be, eng)
    }

    /// `self ∩ other`, reduced to a minimal representation.
    pub fn intersection(&self, other: &Polyhedron, eng: &Engine) -> Result<Polyhedron> {
        if other.dim != self.dim {
            return Err(PolyError::malformed(format!(
                "intersection of `{}` (R^{}) and `{}` (R^{})",
                self.name, self.dim, other.name, other.dim
            )));
        }
        let n = self.dim;
        let (m1, m2) = (self.ni(), other.ni());
        let mut a = DMatrix::zeros(m1 + m2, n);
        a.view_mut((0, 0), (m1, n)).copy_from(&self.a);
        a.view_mut((m1, 0), (m2, n)).copy_from(&other.a);
        let mut b = DVector::zeros(m1 + m2);
        b.rows_mut(0, m1).copy_from(&self.b);
        b.rows_mut(m1, m2).copy_from(&other.b);

        let (e1, e2) = (self.ae.nrows(), other.ae.nrows());
        let mut ae = DMatrix::zeros(e1 + e2, n);
        ae.view_mut((0, 0), (e1, n)).copy_from(&self.ae);
        ae.view_mut((e1, 0), (e2, n)).copy_from(&other.ae);
        let mut be = DVector::zeros(e1 + e2);
        be.rows_mut(0, e1).copy_from(&self.be);
        be.rows_mut(e1, e2).copy_from(&other.be);

        Polyhedron::build(&self.name, a, b, ae, be, eng)?.minrep(eng)
    }

    /// Whether `other ⊆ self`, checked on the generators of `other`.
    pub fn contains(&self, other: &Polyhedron, eng: &Engine) -> Result<bool> {
        if other.dim != self.dim {
            return Err(PolyError::malformed(format!(
                "containment of `{}` (R^{}) in `{}` (R^{})",
                other.name, other.dim, self.name, self.dim
            )));
        }
        let eps = eng.tol.contain;
        let gens = other.vertices(eng)?;
        let homogeneous_ok = |r: &DVector<f64>| {
            (&self.a * r).iter().all(|v| *v <= eps) && (&self.ae * r).iter().all(|v| v.abs() <= eps)
        };
        for v in gens.vertices() {
            if !self.contains_point(&v, eps) {
                return Ok(false);
            }
        }
        for r in gens.rays() {
            if !homogeneous_ok(&r) {
                return Ok(false);
            }
        }
        for l in gens.line_directions() {
            let neg = -&l;
            if !homogeneous_ok(&l) || !homogeneous_ok(&neg) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Apply `M` to every generator. Entries of `M` below `entry_eps` are zeroed
/// and the rest rounded to `map_digits`; each product term is rounded to
/// `product_digits` before summation.
fn map_generators(
    gens: &Generators,
    m: &DMatrix<f64>,
    entry_eps: f64,
    map_digits: i32,
    product_digits: i32,
) -> Generators {
    let mr = m.map(|v| if v.abs() < entry_eps { 0.0 } else { round_to(v, map_digits) });
    let n = gens.dim();
    let rows = DMatrix::from_fn(gens.rows.nrows(), mr.nrows() + 1, |i, k| {
        if k == 0 {
            return gens.rows[(i, 0)];
        }
        (0..n)
            .map(|j| round_to(mr[(k - 1, j)] * gens.rows[(i, j + 1)], product_digits))
            .sum()
    });
    Generators {
        rows,
        lines: gens.lines.clone(),
    }
}
