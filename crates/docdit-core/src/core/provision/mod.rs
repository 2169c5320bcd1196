//! The setup sequence: venv, packages, secrets file, folders, record.

pub mod errors;
pub mod packages;
pub mod probe;
pub mod venv;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::core::config::context::CommandContext;
use crate::core::record::write_install_record;
use crate::core::scaffold::{ensure_directories, ScaffoldReport, DEFAULT_DIRECTORIES};
use crate::core::secrets::ensure_env_file;

use self::packages::{install_packages, parse_package_list, InstallReport, DEFAULT_PACKAGES};
use self::venv::{ensure_isolated, Isolation};

#[derive(Debug, Clone, Serialize)]
pub struct SetupSummary {
    pub packages: InstallReport,
    pub env_file_created: bool,
    pub directories: ScaffoldReport,
    pub record_written: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SetupOutcome {
    /// The installation record exists; nothing was done.
    AlreadyInstalled,
    /// Execution was handed to a relaunch inside the virtual environment.
    Restarted,
    Completed(SetupSummary),
}

/// Runs the full provisioning sequence for the context's base directory.
///
/// # Errors
/// Returns classified [`errors::ProvisionError`]s for the fatal venv and pip
/// paths, and plain errors for filesystem failures.
pub fn run_setup(ctx: &CommandContext) -> Result<SetupOutcome> {
    let record_path = ctx.record_path();
    if record_path.exists() {
        info!("[=] installation record found at {}", record_path.display());
        return Ok(SetupOutcome::AlreadyInstalled);
    }

    info!("[*] starting environment setup in {}", ctx.base_dir().display());
    if ensure_isolated(ctx)? == Isolation::Restarted {
        return Ok(SetupOutcome::Restarted);
    }

    let specs = parse_package_list(DEFAULT_PACKAGES);
    let packages = install_packages(ctx, &specs)?;
    if packages.deferred {
        return Ok(SetupOutcome::Restarted);
    }
    let env_file_created = ensure_env_file(ctx.base_dir())?;
    let directories = ensure_directories(ctx.base_dir(), DEFAULT_DIRECTORIES)?;
    let record_written = write_install_record(&record_path, ctx)?;
    info!("[*] setup finished");

    Ok(SetupOutcome::Completed(SetupSummary {
        packages,
        env_file_created,
        directories,
        record_written,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GlobalOptions;
    use crate::core::scaffold::FUNCTIONS_DIR;
    use crate::core::secrets::ENV_FILE_NAME;
    use crate::core::test_support::{context, FakeEffects, FakePython};
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn not_isolated_means_one_restart_and_no_installs() {
        let temp = tempfile::tempdir().expect("tempdir");
        let effects = Arc::new(FakeEffects::new(FakePython::system()));
        let global = GlobalOptions::default();
        let ctx = context(&global, temp.path(), &[], &["setup"], &effects);

        let outcome = run_setup(&ctx).expect("setup");
        assert!(matches!(outcome, SetupOutcome::Restarted));
        assert_eq!(effects.process.restarts().len(), 1);
        assert!(effects.python.install_attempts().is_empty());
        assert!(!temp.path().join(ENV_FILE_NAME).exists());
        assert!(!ctx.record_path().exists());
    }

    #[test]
    fn isolated_run_completes_every_step() {
        let temp = tempfile::tempdir().expect("tempdir");
        let effects = Arc::new(FakeEffects::new(
            FakePython::isolated()
                .with_installed(&["ipykernel", "psutil"])
                .failing(&["faiss-cpu"]),
        ));
        let global = GlobalOptions::default();
        let ctx = context(&global, temp.path(), &[], &[], &effects);

        let SetupOutcome::Completed(summary) = run_setup(&ctx).expect("setup") else {
            panic!("setup should complete");
        };
        assert!(effects.process.restarts().is_empty());
        assert_eq!(summary.packages.packages.len(), DEFAULT_PACKAGES.len());
        assert_eq!(summary.packages.already_installed(), 2);
        assert_eq!(summary.packages.failed(), 1);
        assert!(summary.env_file_created);
        assert_eq!(summary.directories.created.len(), DEFAULT_DIRECTORIES.len());
        assert_eq!(summary.directories.bootstrapped.len(), 6);
        assert!(summary.record_written);
        assert!(temp.path().join(FUNCTIONS_DIR).join("conversion.py").is_file());
        assert!(ctx.record_path().is_file());
    }

    #[test]
    fn existing_record_short_circuits() {
        let temp = tempfile::tempdir().expect("tempdir");
        let effects = Arc::new(FakeEffects::new(FakePython::system()));
        let global = GlobalOptions::default();
        let ctx = context(&global, temp.path(), &[], &[], &effects);
        fs::write(ctx.record_path(), "done\n").expect("record");

        assert!(matches!(
            run_setup(&ctx).expect("setup"),
            SetupOutcome::AlreadyInstalled
        ));
        assert!(effects.python.calls().is_empty());
        assert!(effects.process.restarts().is_empty());
        assert!(!temp.path().join(".venv").exists());
    }
}
