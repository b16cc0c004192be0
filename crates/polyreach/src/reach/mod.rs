//! Reachability recursion for robust constraint tightening.
//!
//! Given `x⁺ = A x + B u + w`, `y = C x + D u`, disturbance set `W`, terminal
//! set `Xf`, output constraints `Y0`, and feedback gains `K[i]`, the recursion
//! builds transition maps `L[i]` and tightened sets:
//!
//! ```text
//! L[0] = I,   Y[0] = Y0,   Q[0] = Xf
//! L[i+1] = (A + B K[i]) L[i]
//! Y[i+1] = minrep(Y[i] ⊖ (C + D K[i]) L[i] W)
//! Q[i+1] = minrep(Q[i] ⊖ L[i] W)
//! ```
//!
//! Gain synthesis is not done here; a `GainOracle` supplies the gains.

use nalgebra::DMatrix;

use crate::engine::Engine;
use crate::error::{PolyError, Result};
use crate::poly::Polyhedron;

/// `x⁺ = A x + B u`, `y = C x + D u`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearSystem {
    pub a: DMatrix<f64>,
    pub b: DMatrix<f64>,
    pub c: DMatrix<f64>,
    pub d: DMatrix<f64>,
}

impl LinearSystem {
    /// Validates `A: nx×nx`, `B: nx×nu`, `C: nc×nx`, `D: nc×nu`.
    pub fn new(a: DMatrix<f64>, b: DMatrix<f64>, c: DMatrix<f64>, d: DMatrix<f64>) -> Result<Self> {
        let sys = Self { a, b, c, d };
        sys.validate()?;
        Ok(sys)
    }

    fn validate(&self) -> Result<()> {
        let (nx, nu, nc) = (self.nx(), self.nu(), self.nc());
        let shape = |m: &DMatrix<f64>| format!("{}x{}", m.nrows(), m.ncols());
        if !self.a.is_square() || nx == 0 {
            return Err(PolyError::malformed(format!("A must be square and non-empty, is {}", shape(&self.a))));
        }
        if self.b.nrows() != nx {
            return Err(PolyError::malformed(format!("B must have {nx} rows, is {}", shape(&self.b))));
        }
        if self.c.ncols() != nx {
            return Err(PolyError::malformed(format!("C must have {nx} columns, is {}", shape(&self.c))));
        }
        if self.d.nrows() != nc || self.d.ncols() != nu {
            return Err(PolyError::malformed(format!("D must be {nc}x{nu}, is {}", shape(&self.d))));
        }
        Ok(())
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.a.nrows()
    }
    #[inline]
    pub fn nu(&self) -> usize {
        self.b.ncols()
    }
    #[inline]
    pub fn nc(&self) -> usize {
        self.c.nrows()
    }
}

/// Source of the feedback gains `K[0..]`, each `nu×nx`.
pub trait GainOracle {
    fn synthesize(&self, a: &DMatrix<f64>, b: &DMatrix<f64>, horizon: usize) -> Result<Vec<DMatrix<f64>>>;
}

/// Gains supplied up front by the caller.
#[derive(Clone, Debug, Default)]
pub struct FixedGains(pub Vec<DMatrix<f64>>);

impl GainOracle for FixedGains {
    fn synthesize(&self, _a: &DMatrix<f64>, _b: &DMatrix<f64>, _horizon: usize) -> Result<Vec<DMatrix<f64>>> {
        Ok(self.0.clone())
    }
}

/// Output of `reachability_matrices`; all three sequences have `horizon` entries.
#[derive(Clone, Debug)]
pub struct Reachability {
    pub y: Vec<Polyhedron>,
    pub q: Vec<Polyhedron>,
    pub l: Vec<DMatrix<f64>>,
}

/// Run the tightening recursion for `horizon` steps.
pub fn reachability_matrices(
    sys: &LinearSystem,
    w: &Polyhedron,
    xf: &Polyhedron,
    y0: &Polyhedron,
    horizon: usize,
    gains: &dyn GainOracle,
    eng: &Engine,
) -> Result<Reachability> {
    sys.validate()?;
    let (nx, nu, nc) = (sys.nx(), sys.nu(), sys.nc());
    if horizon == 0 {
        return Err(PolyError::malformed("horizon must be at least 1"));
    }
    for (set, name, want) in [(w, "W", nx), (xf, "Xf", nx), (y0, "Y0", nc)] {
        if set.dim() != want {
            return Err(PolyError::malformed(format!("{name} lives in R^{}, expected R^{want}", set.dim())));
        }
    }
    let k = gains.synthesize(&sys.a, &sys.b, horizon)?;
    if k.len() + 1 < horizon {
        return Err(PolyError::malformed(format!(
            "horizon {horizon} needs {} gains, got {}",
            horizon - 1,
            k.len()
        )));
    }
    if let Some((i, bad)) = k
        .iter()
        .take(horizon - 1)
        .enumerate()
        .find(|(_, g)| g.nrows() != nu || g.ncols() != nx)
    {
        return Err(PolyError::malformed(format!(
            "gain K[{i}] must be {nu}x{nx}, is {}x{}",
            bad.nrows(),
            bad.ncols()
        )));
    }

    let mut l = Vec::with_capacity(horizon);
    let mut y = Vec::with_capacity(horizon);
    let mut q = Vec::with_capacity(horizon);
    l.push(DMatrix::<f64>::identity(nx, nx));
    y.push(y0.clone().with_name("Y[0]"));
    q.push(xf.clone().with_name("Q[0]"));

    for i in 0..horizon - 1 {
        let ki = &k[i];
        let li = &l[i];
        let w_name = format!("W[{i}]");

        let wy = w.affine_map_named(&((&sys.c + &sys.d * ki) * li), &w_name, eng)?;
        let y_next = y[i]
            .pontryagin_difference_named(&wy, &format!("Y[{}]", i + 1), eng)?
            .minrep(eng)?;

        let wq = w.affine_map_named(li, &w_name, eng)?;
        let q_next = q[i]
            .pontryagin_difference_named(&wq, &format!("Q[{}]", i + 1), eng)?
            .minrep(eng)?;

        let l_next = (&sys.a + &sys.b * ki) * li;
        tracing::info!(
            step = i + 1,
            y_rows = y_next.ni(),
            q_rows = q_next.ni(),
            "reachability step"
        );
        l.push(l_next);
        y.push(y_next);
        q.push(q_next);
    }
    Ok(Reachability { y, q, l })
}

#[cfg(test)]
mod tests;
