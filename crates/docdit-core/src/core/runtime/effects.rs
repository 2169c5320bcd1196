use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use anyhow::{Context, Result};
use docdit_python::InterpreterInfo;
use docdit_runtime::{run_command, run_command_passthrough, RunOutput};
use sysinfo::System;

use crate::core::provision::venv::RestartRequest;
use crate::core::record::HostFacts;

pub trait PythonRuntime: Send + Sync {
    fn detect_interpreter(&self, explicit: Option<&str>) -> Result<String>;
    fn probe(&self, python: &str) -> Result<InterpreterInfo>;
    fn run_command(
        &self,
        python: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: &Path,
    ) -> Result<RunOutput>;
    fn run_command_passthrough(
        &self,
        python: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: &Path,
    ) -> Result<RunOutput>;
}

pub trait ProcessControl: Send + Sync {
    /// Relaunches the current executable per `request`.
    ///
    /// The system implementation never returns `Ok`: on unix the process
    /// image is replaced, elsewhere the parent exits with the child's code.
    fn restart(&self, request: &RestartRequest) -> Result<()>;
}

pub trait Prompt: Send + Sync {
    fn ask(&self, message: &str) -> Result<String>;
    fn show(&self, message: &str);
}

pub trait HostProbe: Send + Sync {
    fn host_facts(&self, disk_path: &Path) -> HostFacts;
}

pub trait Effects: Send + Sync {
    fn python(&self) -> &dyn PythonRuntime;
    fn process(&self) -> &dyn ProcessControl;
    fn prompt(&self) -> &dyn Prompt;
    fn host(&self) -> &dyn HostProbe;
}

pub type SharedEffects = Arc<dyn Effects>;

pub struct SystemEffects {
    python: Arc<SystemPythonRuntime>,
    process: Arc<SystemProcessControl>,
    prompt: Arc<TerminalPrompt>,
    host: Arc<SystemHost>,
}

impl SystemEffects {
    #[must_use]
    pub fn new() -> Self {
        Self {
            python: Arc::new(SystemPythonRuntime),
            process: Arc::new(SystemProcessControl),
            prompt: Arc::new(TerminalPrompt),
            host: Arc::new(SystemHost),
        }
    }
}

impl Default for SystemEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for SystemEffects {
    fn python(&self) -> &dyn PythonRuntime {
        self.python.as_ref()
    }

    fn process(&self) -> &dyn ProcessControl {
        self.process.as_ref()
    }

    fn prompt(&self) -> &dyn Prompt {
        self.prompt.as_ref()
    }

    fn host(&self) -> &dyn HostProbe {
        self.host.as_ref()
    }
}

struct SystemPythonRuntime;

impl PythonRuntime for SystemPythonRuntime {
    fn detect_interpreter(&self, explicit: Option<&str>) -> Result<String> {
        docdit_python::detect_interpreter(explicit)
    }

    fn probe(&self, python: &str) -> Result<InterpreterInfo> {
        docdit_python::probe_interpreter(python)
    }

    fn run_command(
        &self,
        python: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: &Path,
    ) -> Result<RunOutput> {
        run_command(python, args, env, cwd)
    }

    fn run_command_passthrough(
        &self,
        python: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: &Path,
    ) -> Result<RunOutput> {
        run_command_passthrough(python, args, env, cwd)
    }
}

struct SystemProcessControl;

impl ProcessControl for SystemProcessControl {
    fn restart(&self, request: &RestartRequest) -> Result<()> {
        let exe = std::env::current_exe().context("locating the docdit executable")?;
        let mut command = Command::new(&exe);
        command.args(&request.args);
        for (key, value) in &request.envs {
            command.env(key, value);
        }
        restart_command(command, &exe)
    }
}

#[cfg(unix)]
fn restart_command(mut command: Command, exe: &Path) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let err = command.exec();
    Err(err).with_context(|| format!("failed to re-exec {}", exe.display()))
}

#[cfg(not(unix))]
fn restart_command(mut command: Command, exe: &Path) -> Result<()> {
    let status = command
        .status()
        .with_context(|| format!("failed to relaunch {}", exe.display()))?;
    std::process::exit(status.code().unwrap_or(1));
}

struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&self, message: &str) -> Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{message}").context("writing prompt")?;
        stdout.flush().context("flushing prompt")?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("reading answer from stdin")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn show(&self, message: &str) {
        println!("{message}");
    }
}

struct SystemHost;

impl HostProbe for SystemHost {
    fn host_facts(&self, disk_path: &Path) -> HostFacts {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu_all();

        let cpus = system.cpus();
        let processor = cpus
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .unwrap_or_default();
        let logical_cpus = if cpus.is_empty() {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        } else {
            cpus.len()
        };
        let free_disk_bytes = fs4::available_space(disk_path).unwrap_or_else(|err| {
            tracing::debug!("free space query failed for {}: {err}", disk_path.display());
            0
        });

        HostFacts {
            os_name: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            os_release: System::kernel_version().unwrap_or_default(),
            os_version: System::os_version().unwrap_or_default(),
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            machine: System::cpu_arch(),
            processor,
            logical_cpus,
            total_memory_bytes: system.total_memory(),
            free_disk_bytes,
        }
    }
}

/// Prepends `dir` to a `PATH`-style value.
///
/// # Errors
/// Returns an error when an entry contains the platform separator.
pub(crate) fn prepend_path(dir: &Path, current: Option<&str>) -> Result<OsString> {
    let mut entries: Vec<PathBuf> = vec![dir.to_path_buf()];
    if let Some(current) = current {
        entries.extend(std::env::split_paths(current));
    }
    std::env::join_paths(entries).context("building PATH for the virtual environment")
}
