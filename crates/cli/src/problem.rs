//! JSON problem files and result documents.
//!
//! Matrices are row-major nested arrays. A set is either `{a, b}` (`A x <= b`)
//! or `{a, lb, ub}` (`lb <= A x <= ub`, `null` meaning unbounded).

use anyhow::{bail, Context, Result};
use nalgebra::{DMatrix, DVector};
use polyreach::reach::{LinearSystem, Reachability};
use polyreach::{Engine, Polyhedron, Tolerances};
use serde::{Deserialize, Serialize};

pub type Rows = Vec<Vec<f64>>;

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SetSpec {
    Bounds {
        a: Rows,
        lb: Vec<Option<f64>>,
        ub: Vec<Option<f64>>,
    },
    HRep {
        a: Rows,
        b: Vec<f64>,
    },
}

impl SetSpec {
    pub fn build(&self, name: &str, eng: &Engine) -> Result<Polyhedron> {
        let p = match self {
            SetSpec::HRep { a, b } => {
                let a = matrix(name, a)?;
                Polyhedron::from_hrep(a, DVector::from_column_slice(b), eng)
            }
            SetSpec::Bounds { a, lb, ub } => {
                let a = matrix(name, a)?;
                let lb = DVector::from_iterator(lb.len(), lb.iter().map(|v| v.unwrap_or(f64::NEG_INFINITY)));
                let ub = DVector::from_iterator(ub.len(), ub.iter().map(|v| v.unwrap_or(f64::INFINITY)));
                Polyhedron::from_bounds(a, lb, ub, eng)
            }
        };
        Ok(p.with_context(|| format!("building set `{name}`"))?.with_name(name))
    }
}

/// Input of `cli reach`.
#[derive(Clone, Debug, Deserialize)]
pub struct ProblemFile {
    pub a: Rows,
    pub b: Rows,
    pub c: Rows,
    pub d: Rows,
    pub w: SetSpec,
    pub xf: SetSpec,
    pub y0: SetSpec,
    pub horizon: usize,
    #[serde(default)]
    pub gains: Vec<Rows>,
    #[serde(default)]
    pub tolerances: Tolerances,
}

impl ProblemFile {
    pub fn system(&self) -> Result<LinearSystem> {
        let sys = LinearSystem::new(
            matrix("A", &self.a)?,
            matrix("B", &self.b)?,
            matrix("C", &self.c)?,
            matrix("D", &self.d)?,
        )?;
        Ok(sys)
    }

    pub fn gains(&self) -> Result<Vec<DMatrix<f64>>> {
        self.gains
            .iter()
            .enumerate()
            .map(|(i, k)| matrix(&format!("K[{i}]"), k))
            .collect()
    }
}

/// Dense matrix from nested rows; rejects empty and ragged input.
pub fn matrix(name: &str, rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let Some(first) = rows.first() else {
        bail!("matrix `{name}` has no rows");
    };
    let ncols = first.len();
    if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        bail!("matrix `{name}`: row {i} has {} entries, row 0 has {ncols}", r.len());
    }
    Ok(DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]))
}

fn rows_of(m: &DMatrix<f64>) -> Rows {
    m.row_iter().map(|r| r.iter().copied().collect()).collect()
}

/// Serialised polyhedron.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetOut {
    pub name: String,
    pub a: Rows,
    pub b: Vec<f64>,
    pub ae: Rows,
    pub be: Vec<f64>,
}

impl From<&Polyhedron> for SetOut {
    fn from(p: &Polyhedron) -> Self {
        Self {
            name: p.name().to_string(),
            a: rows_of(p.a()),
            b: p.b().iter().copied().collect(),
            ae: rows_of(p.ae()),
            be: p.be().iter().copied().collect(),
        }
    }
}

/// Output of `cli reach`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReachOut {
    pub y: Vec<SetOut>,
    pub q: Vec<SetOut>,
    pub l: Vec<Rows>,
}

impl From<&Reachability> for ReachOut {
    fn from(r: &Reachability) -> Self {
        Self {
            y: r.y.iter().map(SetOut::from).collect(),
            q: r.q.iter().map(SetOut::from).collect(),
            l: r.l.iter().map(rows_of).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_spec_accepts_both_forms() {
        let eng = Engine::default();
        let h: SetSpec = serde_json::from_str(r#"{"a": [[1.0], [-1.0]], "b": [1.0, 2.0]}"#).unwrap();
        let p = h.build("X", &eng).unwrap();
        assert_eq!(p.name(), "X");
        assert_eq!(p.ni(), 2);

        let bx: SetSpec = serde_json::from_str(r#"{"a": [[1.0, 0.0], [0.0, 1.0]], "lb": [-1.0, null], "ub": [1.0, 3.0]}"#).unwrap();
        let p = bx.build("B", &eng).unwrap();
        assert_eq!(p.ni(), 3);
        assert!(p.contains_point(&nalgebra::dvector![0.0, -50.0], 0.0));
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let err = matrix("A", &[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
        assert!(matrix("A", &[]).is_err());
    }

    #[test]
    fn infeasible_set_names_itself() {
        let eng = Engine::default();
        let h: SetSpec = serde_json::from_str(r#"{"a": [[1.0], [-1.0]], "b": [0.0, -1.0]}"#).unwrap();
        let err = h.build("Xf", &eng).unwrap_err();
        assert!(format!("{err:#}").contains("Xf"));
    }
}
