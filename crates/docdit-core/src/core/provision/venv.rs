use std::ffi::OsString;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::config::context::CommandContext;
use crate::core::config::{BASE_DIR_ENV, PYTHON_ENV, RESTARTED_ENV, VIRTUAL_ENV};
use crate::core::provision::errors::ProvisionError;
use crate::core::runtime::effects::prepend_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Isolation {
    AlreadyIsolated,
    /// A restart was handed off; only observable when the process control
    /// returns instead of replacing the process.
    Restarted,
}

/// Relaunch of the current executable inside the virtual environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartRequest {
    pub args: Vec<OsString>,
    pub envs: Vec<(String, OsString)>,
}

/// Makes sure `.venv` exists and that execution continues inside it.
///
/// Must run before any other provisioning step: when a restart happens the
/// entry sequence starts over in the new process.
///
/// # Errors
/// Returns [`ProvisionError::VenvCreation`] when `python -m venv` fails,
/// [`ProvisionError::RestartLoop`] when a restarted process is still not
/// isolated, and [`ProvisionError::Restart`] when the relaunch itself fails.
pub fn ensure_isolated(ctx: &CommandContext) -> Result<Isolation> {
    let venv = ctx.venv_dir();
    if venv.exists() {
        debug!("virtual environment present at {}", venv.display());
    } else {
        info!("[*] virtual environment '{}' not found; creating it", venv.display());
        create_venv(ctx, &venv)?;
        info!("[✓] virtual environment created");
    }

    if ctx.is_isolated() {
        debug!("already running inside a virtual environment");
        return Ok(Isolation::AlreadyIsolated);
    }
    if ctx.config().restarted() {
        return Err(ProvisionError::RestartLoop { venv }.into());
    }

    let request = restart_request(ctx, &venv)?;
    info!("[*] restarting inside the virtual environment");
    ctx.effects()
        .process()
        .restart(&request)
        .map_err(|err| ProvisionError::Restart {
            reason: format!("{err:#}"),
        })?;
    Ok(Isolation::Restarted)
}

fn create_venv(ctx: &CommandContext, venv: &Path) -> Result<()> {
    let failure = |reason: String| ProvisionError::VenvCreation {
        path: venv.to_path_buf(),
        reason,
    };
    let python = ctx.python().map_err(|err| failure(format!("{err:#}")))?;
    let args = vec![
        "-m".to_string(),
        "venv".to_string(),
        venv.display().to_string(),
    ];
    let output = ctx
        .effects()
        .python()
        .run_command_passthrough(&python, &args, &[], ctx.base_dir())
        .map_err(|err| failure(format!("{err:#}")))?;
    if !output.success() {
        warn!("[✗] {python} -m venv exited with code {}", output.code);
        return Err(failure(format!("{python} -m venv exited with code {}", output.code)).into());
    }
    Ok(())
}

fn restart_request(ctx: &CommandContext, venv: &Path) -> Result<RestartRequest> {
    let bin = docdit_python::venv_bin_dir(venv);
    let python = docdit_python::venv_interpreter(venv);
    let path = prepend_path(&bin, ctx.env().var("PATH"))?;
    Ok(RestartRequest {
        args: ctx.argv().to_vec(),
        envs: vec![
            (VIRTUAL_ENV.to_string(), venv.as_os_str().to_os_string()),
            (PYTHON_ENV.to_string(), python.into_os_string()),
            ("PATH".to_string(), path),
            (
                BASE_DIR_ENV.to_string(),
                ctx.base_dir().as_os_str().to_os_string(),
            ),
            (RESTARTED_ENV.to_string(), OsString::from("1")),
        ],
    })
}
