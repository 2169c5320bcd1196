pub mod config;
pub mod provision;
pub mod record;
pub mod runtime;
pub mod scaffold;
pub mod secrets;
pub mod tooling;

#[cfg(test)]
pub(crate) mod test_support;

use anyhow::Result;
use serde_json::{json, Value};

use crate::core::config::context::CommandContext;
use crate::core::provision::errors::ProvisionError;
use crate::core::provision::{run_setup, SetupOutcome};
use crate::core::secrets::{get_or_create_key, upsert_key, ENV_FILE_NAME, OPENAI_KEY};
use crate::core::tooling::outcome::ExecutionOutcome;

pub const RECORD_FILE_NAME: &str = "installation_info.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocditCommand {
    Setup,
    Key { replace: bool },
}

/// Runs a command and folds classified failures into the outcome.
///
/// # Errors
/// Returns unclassified errors (filesystem, prompt I/O) unchanged.
pub fn execute(ctx: &CommandContext, command: &DocditCommand) -> Result<ExecutionOutcome> {
    if !ctx.base_dir().is_dir() {
        return Ok(ExecutionOutcome::user_error(
            format!("base directory {} does not exist", ctx.base_dir().display()),
            json!({ "hint": "pass an existing folder with --base-dir" }),
        ));
    }
    match command {
        DocditCommand::Setup => match run_setup(ctx) {
            Ok(outcome) => Ok(setup_outcome(ctx, &outcome)),
            Err(err) => match err.downcast_ref::<ProvisionError>() {
                Some(provision) => Ok(ExecutionOutcome::failure(
                    provision.to_string(),
                    json!({ "exit_code": provision.exit_code() }),
                )),
                None => Err(err),
            },
        },
        DocditCommand::Key { replace } => {
            let prompt = ctx.effects().prompt();
            let value = if *replace {
                upsert_key(ctx.base_dir(), OPENAI_KEY, prompt)?
            } else {
                get_or_create_key(ctx.base_dir(), prompt)?
            };
            let state = if value.is_empty() { "empty" } else { "set" };
            Ok(ExecutionOutcome::success(
                format!("{OPENAI_KEY} is {state} in {ENV_FILE_NAME}"),
                json!({ "path": ctx.env_file_path() }),
            ))
        }
    }
}

fn setup_outcome(ctx: &CommandContext, outcome: &SetupOutcome) -> ExecutionOutcome {
    let details = serde_json::to_value(outcome).unwrap_or(Value::Null);
    match outcome {
        SetupOutcome::AlreadyInstalled => ExecutionOutcome::success(
            "workspace already installed",
            json!({
                "hint": format!(
                    "delete {} and run again to reinstall",
                    ctx.record_path().display()
                ),
                "setup": details,
            }),
        ),
        SetupOutcome::Restarted => ExecutionOutcome::success(
            "continuing inside the virtual environment",
            json!({ "setup": details }),
        ),
        SetupOutcome::Completed(summary) => {
            let message = if summary.packages.failed() == 0 {
                "environment configured".to_string()
            } else {
                format!(
                    "environment configured; {} package(s) failed to install",
                    summary.packages.failed()
                )
            };
            ExecutionOutcome::success(message, json!({ "setup": details }))
        }
    }
}
