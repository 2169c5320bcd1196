use std::path::PathBuf;

use thiserror::Error;

/// Fatal provisioning failures that end the setup run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to create virtual environment at {path}: {reason}")]
    VenvCreation { path: PathBuf, reason: String },
    #[error("pip self-upgrade failed with exit code {code}")]
    PipUpgrade { code: i32 },
    #[error("restarted inside {venv} but the interpreter still does not report a virtual environment")]
    RestartLoop { venv: PathBuf },
    #[error("failed to restart inside the virtual environment: {reason}")]
    Restart { reason: String },
}

impl ProvisionError {
    /// Exit code the process should terminate with.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PipUpgrade { code } => *code,
            _ => 2,
        }
    }
}
