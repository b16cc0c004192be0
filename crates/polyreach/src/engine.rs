//! Bundle of the two numerical backends plus the tolerances every operation reads.

use std::fmt;

use crate::cfg::Tolerances;
use crate::enumerate::{Enumerator, ExactEnumerator};
use crate::solver::{MinilpSolver, Solver};

/// Solver, enumerator, and tolerances passed to every polyhedral operation.
///
/// Operations never store the engine; one engine can serve any number of
/// polyhedra.
pub struct Engine {
    pub solver: Box<dyn Solver>,
    pub enumerator: Box<dyn Enumerator>,
    pub tol: Tolerances,
}

impl Engine {
    /// Default backends configured from `tol`.
    pub fn new(tol: Tolerances) -> Self {
        let enumerator = ExactEnumerator {
            hrep_digits: tol.hrep_digits,
            vrep_digits: tol.vrep_digits,
        };
        Self {
            solver: Box::new(MinilpSolver),
            enumerator: Box::new(enumerator),
            tol,
        }
    }

    /// Custom backends.
    pub fn with_backends(
        solver: Box<dyn Solver>,
        enumerator: Box<dyn Enumerator>,
        tol: Tolerances,
    ) -> Self {
        Self {
            solver,
            enumerator,
            tol,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Tolerances::default())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine").field("tol", &self.tol).finish_non_exhaustive()
    }
}
