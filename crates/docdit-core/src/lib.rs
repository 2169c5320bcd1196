#![deny(clippy::all)]

mod core;

pub use crate::core::config::context::CommandContext;
pub use crate::core::config::{Config, EnvSnapshot, GlobalOptions};
pub use crate::core::provision::errors::ProvisionError;
pub use crate::core::provision::packages::{
    install_packages, parse_package_list, upgrade_pip, InstallReport, PackageOutcome, PackageSpec,
    PackageStatus, DEFAULT_PACKAGES,
};
pub use crate::core::provision::probe::is_isolated;
pub use crate::core::provision::venv::{ensure_isolated, Isolation, RestartRequest};
pub use crate::core::provision::{run_setup, SetupOutcome, SetupSummary};
pub use crate::core::record::{
    collect_install_record, render_install_record, write_install_record, HostFacts, InstallRecord,
    InterpreterFacts, RECORD_ENV_VARS,
};
pub use crate::core::runtime::effects::{
    Effects, HostProbe, ProcessControl, Prompt, PythonRuntime, SharedEffects, SystemEffects,
};
pub use crate::core::scaffold::{
    ensure_directories, ensure_functions_bootstrap, ScaffoldReport, DEFAULT_DIRECTORIES,
    FUNCTIONS_DIR, FUNCTION_TEMPLATES,
};
pub use crate::core::secrets::{
    ensure_env_file, get_or_create_key, read_env_file, upsert_key, COMPANION_KEY, ENV_FILE_NAME,
    OPENAI_KEY,
};
pub use crate::core::tooling::logging::{LogOptions, LogSession};
pub use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome};
pub use crate::core::{execute, DocditCommand, RECORD_FILE_NAME};
pub use docdit_runtime::RunOutput;
