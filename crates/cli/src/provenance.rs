use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What produced an artifact: the subcommand, its parameters, and the
/// tolerances in effect.
pub struct Provenance {
    pub command: &'static str,
    pub params: Value,
    pub tolerances: Value,
}

impl Provenance {
    pub fn to_json(&self, outputs: &[&Path]) -> Value {
        json!({
            "code_rev": current_git_rev(),
            "polyreach": polyreach::VERSION,
            "command": self.command,
            "params": self.params,
            "tolerances": self.tolerances,
            "outputs": outputs.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>(),
        })
    }

    /// Write `<stem>.provenance.json` beside `artifact`.
    pub fn write_beside(&self, artifact: &Path) -> Result<PathBuf> {
        let path = sidecar_path(artifact);
        let doc = self.to_json(&[artifact]);
        fs::write(&path, serde_json::to_vec_pretty(&doc)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    artifact.with_file_name(format!("{stem}.provenance.json"))
}

/// Build-time `GIT_COMMIT`, then the runtime variable, then `git rev-parse`.
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|s| !s.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sidecar_replaces_extension() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/run/tightened.json")),
            Path::new("/tmp/run/tightened.provenance.json")
        );
    }

    #[test]
    fn sidecar_lists_artifact_and_command() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("out.json");
        fs::write(&artifact, "{}").unwrap();
        let prov = Provenance {
            command: "reach",
            params: json!({"horizon": 3}),
            tolerances: json!({}),
        };
        let path = prov.write_beside(&artifact).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["command"], "reach");
        assert_eq!(parsed["params"]["horizon"], 3);
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
    }
}
