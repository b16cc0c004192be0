//! Error type for polyhedral operations.
//!
//! Every variant is fatal for the operation that raised it; nothing retries.
//! Messages carry enough data (shapes, offending rows, solver status) to
//! reproduce the failing sub-problem by hand.

use thiserror::Error;

use crate::solver::Status;

/// Errors raised by polyhedron construction, set algebra, and the recursion.
#[derive(Error, Debug)]
pub enum PolyError {
    /// Row/column counts that do not line up.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// Map column count differs from the operand dimension.
    #[error("map for `{name}` must have {dim} columns, has {cols} (map is {rows}x{cols})")]
    MapDimension {
        name: String,
        dim: usize,
        rows: usize,
        cols: usize,
    },

    /// Bound pairs that admit no point.
    #[error("infeasible construction of `{name}`: {detail}\n  offending rows (row, lb, ub): {rows:?}\n  lb = {lb:?}\n  ub = {ub:?}")]
    Infeasible {
        name: String,
        detail: String,
        rows: Vec<(usize, f64, f64)>,
        lb: Vec<f64>,
        ub: Vec<f64>,
    },

    /// Result numerically indistinguishable from a degenerate set.
    #[error("numerical degeneracy in `{name}`: {detail}\n{matrix}")]
    Degenerate {
        name: String,
        detail: String,
        matrix: String,
    },

    /// The enumeration oracle could not build the polyhedron.
    #[error("enumeration oracle failed: {reason}\n{matrix}")]
    Oracle { reason: String, matrix: String },

    /// The LP adapter returned a status callers cannot accept.
    #[error("{context}: solver returned {status}\n{detail}")]
    Solver {
        context: String,
        status: Status,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, PolyError>;

impl PolyError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub(crate) fn oracle(reason: impl Into<String>, matrix: impl Into<String>) -> Self {
        Self::Oracle {
            reason: reason.into(),
            matrix: matrix.into(),
        }
    }
}
