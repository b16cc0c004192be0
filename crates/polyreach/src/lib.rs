//! Polyhedral set algebra and robust constraint tightening.
//!
//! Layers (leaf first):
//! - `cfg`: tolerances and solver settings, serde-loadable.
//! - `solver`: LP seam (`Solver`) with the `minilp` default.
//! - `enumerate`: vertex/facet enumeration seam (`Enumerator`) with the
//!   exact-rational default.
//! - `poly`: `Polyhedron` and its operations; every call takes an `Engine`.
//! - `reach`: the reachability recursion producing tightened sets.
//! - `report`: explicit text formatting.
//!
//! API Policy
//! - Polyhedra are immutable; operations return new instances.
//! - No process-global state: thresholds live in `Tolerances`, printing in
//!   `PrintCfg`.

pub mod cfg;
pub mod engine;
pub mod enumerate;
pub mod error;
pub mod poly;
pub mod reach;
pub mod report;
pub mod solver;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::{SolverSettings, Tolerances};
pub use engine::Engine;
pub use error::{PolyError, Result};
pub use poly::Polyhedron;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::{SolverSettings, Tolerances};
    pub use crate::engine::Engine;
    pub use crate::enumerate::{Enumerator, ExactEnumerator, Generators, Inequalities};
    pub use crate::error::{PolyError, Result};
    pub use crate::poly::{BoundPairs, Polyhedron};
    pub use crate::reach::{reachability_matrices, FixedGains, GainOracle, LinearSystem, Reachability};
    pub use crate::report::{PrintCfg, Report};
    pub use crate::solver::{MinilpSolver, Problem, Solution, Solver, Status};
    pub use nalgebra::{DMatrix, DVector};
}
