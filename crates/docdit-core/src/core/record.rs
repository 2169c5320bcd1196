//! Write-once installation record with host and interpreter facts.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use time::macros::format_description;
use tracing::info;

use crate::core::config::context::CommandContext;
use crate::core::tooling::logging;

/// Environment variables echoed into the record.
pub const RECORD_ENV_VARS: &[&str] = &[
    "PATH",
    "HOME",
    "USER",
    "USERNAME",
    "VIRTUAL_ENV",
    "PYTHONPATH",
    "PYTHONHOME",
    "OPENAI_API_KEY",
];

const NOT_AVAILABLE: &str = "N/A";
const NOT_DEFINED: &str = "not defined";
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

const LAYOUT: &str = "\
    Doc_DIT_System/
    |
    |-- .venv/                      # virtual environment
    |-- .env                        # environment variables (API keys)
    |-- doc/                        # uploaded documents
    |-- functions/                  # helper modules
    |   |-- __init__.py             # package marker
    |   |-- log.py                  # logger configuration
    |   |-- structure.py            # folder creation
    |   |-- conversion.py           # notebook to Markdown conversion
    |   |-- upsert_key.py           # OpenAI key entry
    |   |-- create_key.py           # OpenAI key create/replace
    |-- log/                        # installer and application logs
    |-- markdown/                   # files converted to Markdown
    |-- notebooks/                  # Jupyter notebooks
    |-- installation_info.txt       # this file
";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostFacts {
    pub os_name: String,
    pub os_release: String,
    pub os_version: String,
    pub hostname: String,
    pub machine: String,
    pub processor: String,
    pub logical_cpus: usize,
    pub total_memory_bytes: u64,
    pub free_disk_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpreterFacts {
    pub version: String,
    pub implementation: String,
    pub executable: String,
}

impl InterpreterFacts {
    fn unavailable() -> Self {
        Self {
            version: NOT_AVAILABLE.to_string(),
            implementation: NOT_AVAILABLE.to_string(),
            executable: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallRecord {
    pub installed_at: String,
    pub host: HostFacts,
    pub interpreter: InterpreterFacts,
    pub env_vars: Vec<(String, String)>,
}

/// Gathers everything the record shows, from the context's effects.
///
/// # Errors
/// Returns an error when the installation timestamp cannot be formatted.
pub fn collect_install_record(ctx: &CommandContext, path: &Path) -> Result<InstallRecord> {
    let disk_path = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let host = ctx.effects().host().host_facts(disk_path);

    let interpreter = ctx
        .python()
        .and_then(|python| ctx.effects().python().probe(&python))
        .map_or_else(
            |err| {
                tracing::debug!("interpreter facts unavailable: {err:#}");
                InterpreterFacts::unavailable()
            },
            |info| InterpreterFacts {
                version: info.version,
                implementation: info.implementation,
                executable: info.executable,
            },
        );

    let env_vars = RECORD_ENV_VARS
        .iter()
        .map(|name| {
            let value = ctx.env().var(name).unwrap_or(NOT_DEFINED);
            ((*name).to_string(), value.to_string())
        })
        .collect();

    let installed_at = logging::now()
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .context("formatting installation timestamp")?;

    Ok(InstallRecord {
        installed_at,
        host,
        interpreter,
        env_vars,
    })
}

/// Renders the human-readable record.
#[must_use]
pub fn render_install_record(record: &InstallRecord) -> String {
    let host = &record.host;
    let processor = if host.processor.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        host.processor.as_str()
    };

    let mut out = String::new();
    out.push_str("===========================================\n");
    out.push_str("          SYSTEM: Create Doc DIT System\n");
    out.push_str("===========================================\n\n");
    let _ = writeln!(out, "Installation date: {}\n", record.installed_at);
    out.push_str("Description:\n");
    out.push_str("General information about this Create Doc DIT installation.\n\n");
    out.push_str("Post-install layout:\n");
    out.push_str(LAYOUT);
    out.push_str("\nEnvironment:\n\n");
    let _ = writeln!(
        out,
        "- Operating system: {} {} ({})",
        host.os_name, host.os_release, host.os_version
    );
    let _ = writeln!(out, "- Hostname: {}", host.hostname);
    let _ = writeln!(out, "- Architecture: {}", host.machine);
    let _ = writeln!(out, "- Processor: {processor}");
    let _ = writeln!(out, "- CPU count: {}", host.logical_cpus);
    let _ = writeln!(out, "- Total RAM: {:.2} GB", to_gib(host.total_memory_bytes));
    let _ = writeln!(
        out,
        "- Free disk space (install folder): {:.2} GB",
        to_gib(host.free_disk_bytes)
    );
    let _ = writeln!(out, "- Python version: {}", record.interpreter.version);
    let _ = writeln!(
        out,
        "- Python implementation: {}",
        record.interpreter.implementation
    );
    let _ = writeln!(out, "- Python path: {}", record.interpreter.executable);
    out.push_str("\nImportant environment variables:\n");
    for (name, value) in &record.env_vars {
        let _ = writeln!(out, "  - {name}: {value}");
    }
    out.push_str("\n-------------------------------------------\n");
    out
}

/// Writes the record at `path` unless it already exists.
///
/// Returns whether a file was written; an existing record is never touched.
///
/// # Errors
/// Returns an error when facts cannot be collected or the file cannot be
/// written.
pub fn write_install_record(path: &Path, ctx: &CommandContext) -> Result<bool> {
    if path.exists() {
        info!("[=] file already exists: {}", path.display());
        return Ok(false);
    }
    let record = collect_install_record(ctx, path)?;
    fs::write(path, render_install_record(&record))
        .with_context(|| format!("writing {}", path.display()))?;
    info!("[✓] file created: {}", path.display());
    Ok(true)
}

#[allow(clippy::cast_precision_loss)]
fn to_gib(bytes: u64) -> f64 {
    (bytes as f64 / GIB * 100.0).round() / 100.0
}
