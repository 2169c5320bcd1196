//! Standard directory tree and the `functions/` helper modules.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

pub const FUNCTIONS_DIR: &str = "functions";

pub const DEFAULT_DIRECTORIES: &[&str] = &["doc", "notebooks", "log", FUNCTIONS_DIR, "markdown"];

/// Helper modules written into a freshly created `functions/` directory.
pub const FUNCTION_TEMPLATES: &[(&str, &str)] = &[
    (
        "__init__.py",
        include_str!("../../../templates/functions/__init__.py"),
    ),
    ("log.py", include_str!("../../../templates/functions/log.py")),
    (
        "structure.py",
        include_str!("../../../templates/functions/structure.py"),
    ),
    (
        "conversion.py",
        include_str!("../../../templates/functions/conversion.py"),
    ),
    (
        "upsert_key.py",
        include_str!("../../../templates/functions/upsert_key.py"),
    ),
    (
        "create_key.py",
        include_str!("../../../templates/functions/create_key.py"),
    ),
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScaffoldReport {
    pub created: Vec<PathBuf>,
    pub existing: Vec<PathBuf>,
    pub bootstrapped: Vec<PathBuf>,
}

/// Creates each missing directory under `base_dir`.
///
/// Existing directories are left alone. A newly created `functions/` is
/// populated via [`ensure_functions_bootstrap`].
///
/// # Errors
/// Filesystem errors are returned as-is; they end the setup run.
pub fn ensure_directories(base_dir: &Path, names: &[&str]) -> Result<ScaffoldReport> {
    let mut report = ScaffoldReport::default();
    for name in names {
        let dir = base_dir.join(name);
        if dir.exists() {
            info!("[=] folder already exists: {}", dir.display());
            report.existing.push(dir);
            continue;
        }
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        info!("[+] created folder: {}", dir.display());
        if *name == FUNCTIONS_DIR {
            report.bootstrapped = ensure_functions_bootstrap(&dir)?;
        }
        report.created.push(dir);
    }
    Ok(report)
}

/// Writes every helper template into `functions_dir`, overwriting.
///
/// # Errors
/// Returns an error when a file cannot be written.
pub fn ensure_functions_bootstrap(functions_dir: &Path) -> Result<Vec<PathBuf>> {
    info!("[*] writing default modules into {}", functions_dir.display());
    let mut written = Vec::with_capacity(FUNCTION_TEMPLATES.len());
    for (name, contents) in FUNCTION_TEMPLATES {
        let path = functions_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        info!("[+] created: {name}");
        written.push(path);
    }
    Ok(written)
}
