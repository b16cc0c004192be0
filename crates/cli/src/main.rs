mod problem;
mod provenance;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polyreach::reach::{reachability_matrices, FixedGains, Reachability};
use polyreach::report::{PrintCfg, Report};
use polyreach::{Engine, Polyhedron, Tolerances};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

use problem::{ProblemFile, ReachOut, SetSpec};
use provenance::Provenance;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Robust constraint tightening for linear systems")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Run the reachability recursion on a JSON problem file
    Reach {
        #[arg(long)]
        input: PathBuf,
        /// Write tightened sets as JSON (plus a provenance sidecar)
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value_t = 4)]
        precision: usize,
    },
    /// Reduce a single set to its minimal representation
    Minrep {
        #[arg(long)]
        input: PathBuf,
        /// Optional tolerance overrides (JSON)
        #[arg(long)]
        tolerances: Option<PathBuf>,
        #[arg(long, default_value_t = 4)]
        precision: usize,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Reach {
            input,
            out,
            precision,
        } => {
            let (r, _) = reach(&input, out.as_deref())?;
            print_sets(r.y.iter().chain(r.q.iter()), precision);
            Ok(())
        }
        Action::Minrep {
            input,
            tolerances,
            precision,
        } => {
            let (before, after) = minrep(&input, tolerances.as_deref())?;
            print_sets([&before, &after], precision);
            Ok(())
        }
        Action::Report => report(),
    }
}

fn print_sets<'a>(sets: impl IntoIterator<Item = &'a Polyhedron>, precision: usize) {
    let cfg = PrintCfg {
        precision,
        ..PrintCfg::default()
    };
    for p in sets {
        println!("{}", Report::new(p, cfg));
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

fn reach(input: &Path, out: Option<&Path>) -> Result<(Reachability, Option<PathBuf>)> {
    let problem: ProblemFile = read_json(input)?;
    tracing::info!(input = %input.display(), horizon = problem.horizon, "reach");
    let eng = Engine::new(problem.tolerances.clone());

    let sys = problem.system().context("system matrices")?;
    let w = problem.w.build("W", &eng)?;
    let xf = problem.xf.build("Xf", &eng)?;
    let y0 = problem.y0.build("Y0", &eng)?;
    let gains = FixedGains(problem.gains()?);

    let r = reachability_matrices(&sys, &w, &xf, &y0, problem.horizon, &gains, &eng)
        .context("reachability recursion")?;

    let Some(out) = out else {
        return Ok((r, None));
    };
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(out, serde_json::to_vec_pretty(&ReachOut::from(&r))?)
        .with_context(|| format!("writing {}", out.display()))?;
    let prov = Provenance {
        command: "reach",
        params: serde_json::json!({
            "input": input.to_string_lossy(),
            "horizon": problem.horizon,
            "gains": problem.gains.len(),
        }),
        tolerances: serde_json::to_value(&problem.tolerances)?,
    };
    let sidecar = prov.write_beside(out)?;
    tracing::info!(out = %out.display(), sidecar = %sidecar.display(), "wrote results");
    Ok((r, Some(sidecar)))
}

fn minrep(input: &Path, tolerances: Option<&Path>) -> Result<(Polyhedron, Polyhedron)> {
    let tol: Tolerances = match tolerances {
        Some(path) => read_json(path)?,
        None => Tolerances::default(),
    };
    let eng = Engine::new(tol);
    let spec: SetSpec = read_json(input)?;
    let set = spec.build("X", &eng)?;
    let reduced = set.minrep(&eng).context("minimal representation")?;
    tracing::info!(before = set.ni(), after = reduced.ni(), "minrep");
    Ok((set, reduced.with_name("minrep(X)")))
}

fn report() -> Result<()> {
    let obj = Provenance {
        command: "report",
        params: serde_json::json!({}),
        tolerances: serde_json::to_value(Tolerances::default())?,
    }
    .to_json(&[]);
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SHIFT_REGISTER: &str = r#"{
        "a": [[0.0, 1.0], [0.0, 0.0]],
        "b": [[0.0], [1.0]],
        "c": [[1.0, 0.0], [0.0, 1.0]],
        "d": [[0.0], [0.0]],
        "w":  {"a": [[1.0, 0.0], [0.0, 1.0]], "lb": [-0.1, -0.1], "ub": [0.1, 0.1]},
        "xf": {"a": [[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]], "b": [1.0, 1.0, 1.0, 1.0]},
        "y0": {"a": [[1.0, 0.0], [0.0, 1.0]], "lb": [-2.0, -2.0], "ub": [2.0, 2.0]},
        "horizon": 3,
        "gains": [[[0.0, 0.0]], [[0.0, 0.0]]]
    }"#;

    #[test]
    fn reach_writes_results_and_sidecar() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("problem.json");
        fs::write(&input, SHIFT_REGISTER).unwrap();
        let out = dir.path().join("nested").join("tightened.json");

        let (r, sidecar) = reach(&input, Some(out.as_path())).unwrap();
        assert_eq!(r.y.len(), 3);
        let sidecar = sidecar.unwrap();
        assert_eq!(sidecar, dir.path().join("nested").join("tightened.provenance.json"));

        let doc: ReachOut = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(doc.y.len(), 3);
        assert_eq!(doc.q[2].name, "Q[2]");
        assert_eq!(doc.l[1], vec![vec![0.0, 1.0], vec![0.0, 0.0]]);
        let prov: serde_json::Value = serde_json::from_slice(&fs::read(sidecar).unwrap()).unwrap();
        assert_eq!(prov["params"]["horizon"], 3);
    }

    #[test]
    fn reach_without_out_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("problem.json");
        fs::write(&input, SHIFT_REGISTER).unwrap();
        let (_, sidecar) = reach(&input, None).unwrap();
        assert!(sidecar.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn reach_reports_missing_gains() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("problem.json");
        let no_gains = SHIFT_REGISTER.replace(r#""gains": [[[0.0, 0.0]], [[0.0, 0.0]]]"#, r#""gains": []"#);
        fs::write(&input, no_gains).unwrap();
        let err = reach(&input, None).unwrap_err();
        assert!(format!("{err:#}").contains("needs 2 gains"));
    }

    #[test]
    fn minrep_drops_redundant_rows() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("set.json");
        fs::write(&input, r#"{"a": [[1.0], [-1.0], [1.0], [-1.0]], "b": [5.0, 5.0, 10.0, 10.0]}"#).unwrap();
        let (before, after) = minrep(&input, None).unwrap();
        assert_eq!(before.ni(), 4);
        assert_eq!(after.ni(), 2);
        assert_eq!(after.b().as_slice(), &[5.0, 5.0]);
    }

    #[test]
    fn unreadable_input_names_the_path() {
        let err = minrep(Path::new("/nonexistent/set.json"), None).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/set.json"));
    }
}
