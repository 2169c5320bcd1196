//! pip-driven package installation into the virtual environment.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::config::context::CommandContext;
use crate::core::provision::errors::ProvisionError;
use crate::core::provision::venv::{ensure_isolated, Isolation};

/// Installation order of the toolchain's third-party packages.
pub const DEFAULT_PACKAGES: &[&str] = &[
    "ipykernel",
    "langchain==0.1.16",
    "langchain-community==0.0.33",
    "langchain-openai==0.1.3",
    "openai==1.55.3",
    "huggingface_hub==0.22.2",
    "transformers==4.39.3",
    "jinja2==3.1.3",
    "tiktoken==0.6.0",
    "pypdf==4.2.0",
    "yt_dlp==2024.4.9",
    "pydub==0.25.1",
    "beautifulsoup4==4.12.3",
    "python-dotenv",
    "sentence-transformers==2.7.0",
    "langchain-chroma",
    "faiss-cpu",
    "lark",
    "python-docx",
    "gradio==5.39.0",
    "psutil",
    "nbconvert",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl PackageSpec {
    /// Requirement string handed to `pip install`.
    #[must_use]
    pub fn requirement(&self) -> String {
        self.to_string()
    }

    /// PEP 503 normalized project name.
    #[must_use]
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl FromStr for PackageSpec {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            bail!("not a package requirement: {raw:?}");
        }
        let (name, version) = match trimmed.split_once("==") {
            Some((name, version)) => (name.trim(), Some(version.trim())),
            None => (trimmed, None),
        };
        if name.is_empty() {
            bail!("package requirement without a name: {raw:?}");
        }
        Ok(Self {
            name: name.to_string(),
            version: version
                .filter(|version| !version.is_empty())
                .map(ToOwned::to_owned),
        })
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}=={version}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Parses requirement lines, skipping blanks and `#` comments with a notice.
#[must_use]
pub fn parse_package_list(lines: &[&str]) -> Vec<PackageSpec> {
    let mut specs = Vec::with_capacity(lines.len());
    for line in lines {
        match line.parse::<PackageSpec>() {
            Ok(spec) => specs.push(spec),
            Err(_) => info!("[→] skipping: {line}"),
        }
    }
    specs
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PackageStatus {
    AlreadyInstalled,
    Installed,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageOutcome {
    pub spec: PackageSpec,
    #[serde(flatten)]
    pub status: PackageStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    /// Set when installation was handed off to a restart inside the venv.
    pub deferred: bool,
    pub packages: Vec<PackageOutcome>,
}

impl InstallReport {
    fn count(&self, matches: impl Fn(&PackageStatus) -> bool) -> usize {
        self.packages
            .iter()
            .filter(|outcome| matches(&outcome.status))
            .count()
    }

    #[must_use]
    pub fn already_installed(&self) -> usize {
        self.count(|status| matches!(status, PackageStatus::AlreadyInstalled))
    }

    #[must_use]
    pub fn installed(&self) -> usize {
        self.count(|status| matches!(status, PackageStatus::Installed))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, PackageStatus::Failed { .. }))
    }
}

/// Upgrades pip for the active interpreter.
///
/// # Errors
/// Returns [`ProvisionError::PipUpgrade`] carrying the pip exit code; this is
/// the fatal path of the installation sequence.
pub fn upgrade_pip(ctx: &CommandContext, python: &str) -> Result<()> {
    info!("[*] upgrading pip to the latest version");
    let args = pip_args(&["install", "--upgrade", "pip"]);
    let code = match ctx
        .effects()
        .python()
        .run_command_passthrough(python, &args, &[], ctx.base_dir())
    {
        Ok(output) if output.success() => {
            info!("[✓] pip upgraded");
            return Ok(());
        }
        Ok(output) => output.code,
        Err(err) => {
            warn!("[✗] could not run pip: {err:#}");
            1
        }
    };
    let code = if code > 0 { code } else { 1 };
    warn!("[✗] error upgrading pip (exit code {code})");
    Err(ProvisionError::PipUpgrade { code }.into())
}

/// Installs every spec that is not already present, in order.
///
/// A failing package is logged and the batch continues. When the process is
/// not inside the virtual environment yet, provisioning is delegated to
/// [`ensure_isolated`] and nothing is installed.
///
/// # Errors
/// Fails only when the interpreter cannot be located, pip cannot upgrade
/// itself, or delegating to the provisioner fails.
pub fn install_packages(ctx: &CommandContext, specs: &[PackageSpec]) -> Result<InstallReport> {
    let python = ctx.python()?;
    upgrade_pip(ctx, &python)?;

    if !ctx.is_isolated() {
        warn!("[*] not running inside a virtual environment; provisioning one");
        let isolation = ensure_isolated(ctx)?;
        debug!(?isolation, "package installation deferred");
        return Ok(InstallReport {
            deferred: isolation == Isolation::Restarted,
            packages: Vec::new(),
        });
    }
    info!("[✓] virtual environment is active");

    info!("[*] installing required packages");
    let mut report = InstallReport::default();
    for spec in specs {
        let status = install_one(ctx, &python, spec);
        report.packages.push(PackageOutcome {
            spec: spec.clone(),
            status,
        });
    }
    info!(
        "[✓] package installation finished: {} installed, {} already present, {} failed",
        report.installed(),
        report.already_installed(),
        report.failed()
    );
    Ok(report)
}

fn install_one(ctx: &CommandContext, python: &str, spec: &PackageSpec) -> PackageStatus {
    if is_installed(ctx, python, spec) {
        info!("[✓] already installed: {spec}");
        return PackageStatus::AlreadyInstalled;
    }

    info!("[*] installing: {spec}");
    let args = pip_args(&["install", &spec.requirement(), "--no-cache-dir"]);
    let reason = match ctx
        .effects()
        .python()
        .run_command_passthrough(python, &args, &[], ctx.base_dir())
    {
        Ok(output) if output.success() => {
            info!("[✓] installed: {spec}");
            return PackageStatus::Installed;
        }
        Ok(output) => format!("pip exited with code {}", output.code),
        Err(err) => format!("{err:#}"),
    };
    warn!("[✗] error installing {spec}: {reason}; continuing with the next package");
    PackageStatus::Failed { reason }
}

fn is_installed(ctx: &CommandContext, python: &str, spec: &PackageSpec) -> bool {
    let args = pip_args(&["show", &spec.name]);
    match ctx
        .effects()
        .python()
        .run_command(python, &args, &[], ctx.base_dir())
    {
        Ok(output) if output.success() => output
            .stdout
            .lines()
            .filter_map(|line| line.strip_prefix("Name:"))
            .any(|name| normalize_name(name) == spec.normalized_name()),
        Ok(output) => {
            debug!("pip show {} reported not found (code {})", spec.name, output.code);
            false
        }
        Err(err) => {
            debug!("pip show {} failed: {err:#}", spec.name);
            false
        }
    }
}

fn pip_args(rest: &[&str]) -> Vec<String> {
    ["-m", "pip"]
        .iter()
        .chain(rest)
        .map(|arg| (*arg).to_string())
        .collect()
}

pub(crate) fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut last_dash = false;
    for ch in name.trim().chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !last_dash {
                normalized.push('-');
            }
            last_dash = true;
        } else {
            normalized.push(ch.to_ascii_lowercase());
            last_dash = false;
        }
    }
    normalized
}
