//! Tighten output constraints for a double integrator under deadbeat feedback.
//!
//! Usage:
//!   cargo run -p polyreach --example double_integrator
//!
//! Prints `Y[i]` and `Q[i]` for a horizon of 3 with `W = [-0.1, 0.1]^2`.

use nalgebra::{dmatrix, dvector, DMatrix};
use polyreach::reach::{reachability_matrices, FixedGains, LinearSystem};
use polyreach::report::{PrintCfg, Report};
use polyreach::{Engine, Polyhedron};

fn main() -> polyreach::Result<()> {
    let eng = Engine::default();
    let sys = LinearSystem::new(
        dmatrix![1.0, 1.0; 0.0, 1.0],
        dmatrix![0.0; 1.0],
        DMatrix::identity(2, 2),
        DMatrix::zeros(2, 1),
    )?;
    // A + B K = [[1, 1], [-1, -1]] squares to zero
    let k = dmatrix![-1.0, -2.0];
    let w = Polyhedron::from_box(dvector![-0.1, -0.1], dvector![0.1, 0.1], &eng)?;
    let xf = Polyhedron::from_box(dvector![-1.0, -1.0], dvector![1.0, 1.0], &eng)?;
    let y0 = Polyhedron::from_box(dvector![-2.0, -2.0], dvector![2.0, 2.0], &eng)?;

    let r = reachability_matrices(&sys, &w, &xf, &y0, 3, &FixedGains(vec![k.clone(), k]), &eng)?;
    let cfg = PrintCfg {
        precision: 3,
        width: 7,
    };
    for (y, q) in r.y.iter().zip(&r.q) {
        println!("{}", Report::new(y, cfg));
        println!("{}", Report::new(q, cfg));
    }
    Ok(())
}
