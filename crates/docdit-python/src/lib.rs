//! Python interpreter discovery, virtual environment layout and probing.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

pub const VENV_DIR_NAME: &str = ".venv";

pub const PROBE_SCRIPT: &str = r#"import json, platform, sys
data = {
    "version": platform.python_version(),
    "implementation": platform.python_implementation(),
    "executable": sys.executable,
    "prefix": sys.prefix,
    "base_prefix": getattr(sys, "base_prefix", sys.prefix),
    "real_prefix": getattr(sys, "real_prefix", None),
}
print(json.dumps(data))
"#;

/// Detects the Python interpreter docdit should drive.
///
/// An explicit override (normally `DOCDIT_PYTHON`) wins; otherwise the first of
/// `python3`/`python` found on `PATH`.
///
/// # Errors
///
/// Returns an error when no interpreter can be found or the detected path is
/// not valid UTF-8.
pub fn detect_interpreter(explicit: Option<&str>) -> Result<String> {
    if let Some(explicit) = explicit.filter(|value| !value.trim().is_empty()) {
        return Ok(explicit.to_string());
    }

    for candidate in ["python3", "python"] {
        if let Ok(path) = which::which(candidate) {
            return path
                .into_os_string()
                .into_string()
                .map_err(|_| anyhow!("non-utf8 path"));
        }
    }

    bail!("no python interpreter found; set DOCDIT_PYTHON")
}

#[must_use]
pub fn venv_dir(base_dir: &Path) -> PathBuf {
    base_dir.join(VENV_DIR_NAME)
}

/// Directory holding the environment's executables.
#[must_use]
pub fn venv_bin_dir(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts")
    } else {
        venv.join("bin")
    }
}

#[must_use]
pub fn venv_interpreter(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_bin_dir(venv).join("python.exe")
    } else {
        venv_bin_dir(venv).join("python")
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct InterpreterInfo {
    pub version: String,
    pub implementation: String,
    pub executable: String,
    pub prefix: String,
    pub base_prefix: String,
    #[serde(default)]
    pub real_prefix: Option<String>,
}

impl InterpreterInfo {
    /// Whether the interpreter runs inside a virtual environment, either the
    /// `venv` kind (prefix differs from base prefix) or the legacy
    /// `virtualenv` kind (`sys.real_prefix`).
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.real_prefix.is_some() || self.prefix != self.base_prefix
    }
}

/// Parses the payload printed by [`PROBE_SCRIPT`].
///
/// # Errors
///
/// Returns an error when the payload is not the expected JSON document.
pub fn parse_probe(payload: &str) -> Result<InterpreterInfo> {
    serde_json::from_str(payload.trim()).context("invalid interpreter probe payload")
}

/// Runs [`PROBE_SCRIPT`] with the given interpreter.
///
/// # Errors
///
/// Returns an error when the interpreter cannot be invoked or the payload is
/// malformed.
pub fn probe_interpreter(python: &str) -> Result<InterpreterInfo> {
    let output = Command::new(python)
        .arg("-c")
        .arg(PROBE_SCRIPT)
        .output()
        .with_context(|| format!("failed to probe interpreter via {python}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("python interpreter probe failed: {stderr}");
    }
    parse_probe(&String::from_utf8_lossy(&output.stdout))
}
