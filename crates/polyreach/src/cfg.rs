//! Tolerance configuration shared by every polyhedral operation.
//!
//! Policy
//! - All thresholds live in one `Tolerances` value that travels with the
//!   `Engine`, so sensitivity studies only need to swap one struct.
//! - Defaults reproduce the constants the pipeline was tuned with. Every field
//!   has a serde default, so a config file may override any subset.

use serde::{Deserialize, Serialize};

/// Settings forwarded to the LP adapter on every solve.
///
/// Infeasibility is decided by the backend's own pivoting tolerance, not by
/// `eps_abs`/`eps_rel`: a system that misses feasibility by more than about
/// 1e-8 is reported infeasible. The two epsilons only grade an accepted
/// solution as `Solved` or `SolvedInaccurate`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub eps_abs: f64,
    pub eps_rel: f64,
    /// Iteration cap for backends that have one; `minilp` runs to completion.
    pub max_iter: usize,
    pub verbose: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            eps_abs: 1e-6,
            eps_rel: 1e-6,
            max_iter: 10_000,
            verbose: false,
        }
    }
}

impl SolverSettings {
    /// Feasibility LP run after every bound-pair construction.
    pub fn feasibility() -> Self {
        Self::default()
    }

    /// Per-row redundancy LPs in `minrep`.
    pub fn minrep() -> Self {
        Self {
            eps_abs: 1e-4,
            eps_rel: 1e-4,
            max_iter: 50_000_000,
            verbose: false,
        }
    }

    /// Per-row support-function LPs in the Pontryagin difference.
    pub fn support() -> Self {
        Self {
            eps_abs: 1e-4,
            eps_rel: 5e-3,
            max_iter: 5_000,
            verbose: false,
        }
    }
}

/// Numeric thresholds used across the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Entries of `A, b` below this magnitude are snapped to zero at ingestion.
    pub snap: f64,
    /// Half-width of the emptiness proxy band around the origin.
    pub empty: f64,
    /// `|det M|` above which a square map is treated as invertible.
    pub det: f64,
    /// Frobenius norm at or below which a map is rejected as zero.
    pub map_zero: f64,
    /// Map entries below this magnitude are zeroed before vertex mapping.
    pub map_entry: f64,
    /// Decimals kept for map entries on the vertex path (and for `pre`).
    pub map_digits: i32,
    /// Decimals kept for each per-term product on the vertex path.
    pub product_digits: i32,
    /// A mapped vertex set entirely below this magnitude is a degenerate image.
    pub image_zero: f64,
    /// Decimals kept when converting an H-rep to exact rationals.
    pub hrep_digits: u32,
    /// Decimals kept when converting generators to exact rationals.
    pub vrep_digits: u32,
    /// Slack added to the row under test in a redundancy LP.
    pub redundancy_slack: f64,
    /// Relative margin by which a redundancy LP optimum must exceed the bound.
    pub redundancy: f64,
    /// Membership slack used by `contains`.
    pub contain: f64,
    pub feasibility: SolverSettings,
    pub minrep: SolverSettings,
    pub support: SolverSettings,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            snap: 1e-12,
            empty: 1e-6,
            det: 1e-8,
            map_zero: 1e-5,
            map_entry: 1e-7,
            map_digits: 6,
            product_digits: 8,
            image_zero: 1e-3,
            hrep_digits: 6,
            vrep_digits: 8,
            redundancy_slack: 1.0,
            redundancy: 1e-9,
            contain: 1e-7,
            feasibility: SolverSettings::feasibility(),
            minrep: SolverSettings::minrep(),
            support: SolverSettings::support(),
        }
    }
}

/// Round `x` to `digits` decimals (half away from zero).
#[inline]
pub(crate) fn round_to(x: f64, digits: i32) -> f64 {
    let s = 10f64.powi(digits);
    (x * s).round() / s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let tol: Tolerances = serde_json::from_str(r#"{"empty": 1e-4, "minrep": {"max_iter": 10}}"#)
            .expect("valid config");
        assert_eq!(tol.empty, 1e-4);
        assert_eq!(tol.minrep.max_iter, 10);
        assert_eq!(tol.minrep.eps_abs, SolverSettings::default().eps_abs);
        assert_eq!(tol.snap, Tolerances::default().snap);
    }

    #[test]
    fn rounding_is_decimal() {
        assert_eq!(round_to(0.123456789, 6), 0.123457);
        assert_eq!(round_to(-2.5e-9, 8), -0.0);
    }
}
