//! Text rendering of polyhedra.
//!
//! Formatting is explicit: callers pass a `PrintCfg` to `Report`; nothing is
//! process-global. `Display for Polyhedron` uses `PrintCfg::default()`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::poly::Polyhedron;

/// Number formatting for reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintCfg {
    /// Digits after the decimal point.
    pub precision: usize,
    /// Minimum field width per entry.
    pub width: usize,
}

impl Default for PrintCfg {
    fn default() -> Self {
        Self {
            precision: 4,
            width: 9,
        }
    }
}

/// A polyhedron paired with the formatting used to print it.
pub struct Report<'a> {
    pub poly: &'a Polyhedron,
    pub cfg: PrintCfg,
}

impl<'a> Report<'a> {
    pub fn new(poly: &'a Polyhedron, cfg: PrintCfg) -> Self {
        Self { poly, cfg }
    }

    fn row(&self, f: &mut fmt::Formatter<'_>, coeffs: &[f64], rel: &str, rhs: f64) -> fmt::Result {
        let (w, p) = (self.cfg.width, self.cfg.precision);
        write!(f, "  [")?;
        for c in coeffs {
            write!(f, " {c:>w$.p$}")?;
        }
        writeln!(f, " ] x {rel} [ {rhs:>w$.p$} ]")
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.poly;
        let (a, b) = (p.a(), p.b());
        let (ae, be) = (p.ae(), p.be());
        writeln!(
            f,
            "{} = {{x in R^{} : A x <= b}} ({} inequalities, {} equalities)",
            p.name(),
            p.dim(),
            a.nrows(),
            ae.nrows()
        )?;
        for i in 0..a.nrows() {
            let coeffs: Vec<f64> = a.row(i).iter().copied().collect();
            self.row(f, &coeffs, "<=", b[i])?;
        }
        for i in 0..ae.nrows() {
            let coeffs: Vec<f64> = ae.row(i).iter().copied().collect();
            self.row(f, &coeffs, " =", be[i])?;
        }
        Ok(())
    }
}

impl fmt::Display for Polyhedron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Report::new(self, PrintCfg::default()))
    }
}
