use std::collections::{HashSet, VecDeque};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use docdit_python::InterpreterInfo;
use docdit_runtime::RunOutput;

use crate::core::config::context::CommandContext;
use crate::core::config::{EnvSnapshot, GlobalOptions};
use crate::core::provision::packages::normalize_name;
use crate::core::provision::venv::RestartRequest;
use crate::core::record::HostFacts;
use crate::core::runtime::effects::{
    Effects, HostProbe, ProcessControl, Prompt, PythonRuntime, SharedEffects,
};

pub(crate) fn context(
    global: &GlobalOptions,
    base_dir: &Path,
    env: &[(&str, &str)],
    argv: &[&str],
    effects: &Arc<FakeEffects>,
) -> CommandContext {
    let base = base_dir.display().to_string();
    let mut pairs = vec![("DOCDIT_BASE_DIR", base.as_str())];
    pairs.extend_from_slice(env);
    let shared: SharedEffects = effects.clone();
    CommandContext::from_parts(
        global,
        EnvSnapshot::testing(&pairs),
        argv.iter().map(OsString::from).collect(),
        shared,
    )
    .expect("context")
}

pub(crate) struct FakePython {
    info: Option<InterpreterInfo>,
    installed: Mutex<HashSet<String>>,
    failing: HashSet<String>,
    pip_upgrade_code: i32,
    venv_code: i32,
    probes: Mutex<usize>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakePython {
    fn with_info(info: Option<InterpreterInfo>) -> Self {
        Self {
            info,
            installed: Mutex::new(HashSet::new()),
            failing: HashSet::new(),
            pip_upgrade_code: 0,
            venv_code: 0,
            probes: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn system() -> Self {
        Self::with_info(Some(InterpreterInfo {
            version: "3.11.9".into(),
            implementation: "CPython".into(),
            executable: "/usr/bin/python3".into(),
            prefix: "/usr".into(),
            base_prefix: "/usr".into(),
            real_prefix: None,
        }))
    }

    pub(crate) fn isolated() -> Self {
        Self::with_info(Some(InterpreterInfo {
            version: "3.11.9".into(),
            implementation: "CPython".into(),
            executable: "/work/.venv/bin/python".into(),
            prefix: "/work/.venv".into(),
            base_prefix: "/usr".into(),
            real_prefix: None,
        }))
    }

    pub(crate) fn broken_probe() -> Self {
        Self::with_info(None)
    }

    pub(crate) fn with_installed(self, names: &[&str]) -> Self {
        {
            let mut installed = self.installed.lock().expect("installed");
            installed.extend(names.iter().map(|name| normalize_name(name)));
        }
        self
    }

    pub(crate) fn failing(mut self, names: &[&str]) -> Self {
        self.failing
            .extend(names.iter().map(|name| normalize_name(name)));
        self
    }

    pub(crate) fn pip_upgrade_exit_code(mut self, code: i32) -> Self {
        self.pip_upgrade_code = code;
        self
    }

    pub(crate) fn venv_exit_code(mut self, code: i32) -> Self {
        self.venv_code = code;
        self
    }

    pub(crate) fn probe_count(&self) -> usize {
        *self.probes.lock().expect("probes")
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("calls").clone()
    }

    pub(crate) fn venv_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.get(1).map(String::as_str) == Some("venv"))
            .count()
    }

    /// Requirements passed to `pip install`, excluding the pip self-upgrade.
    pub(crate) fn install_attempts(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|call| call.len() > 3 && call[1] == "pip" && call[2] == "install")
            .filter(|call| call[3] != "--upgrade")
            .map(|call| call[3].clone())
            .collect()
    }

    fn respond(&self, args: &[String]) -> RunOutput {
        self.calls.lock().expect("calls").push(args.to_vec());
        let words: Vec<&str> = args.iter().map(String::as_str).collect();
        match words.as_slice() {
            ["-m", "venv", dir] => {
                if self.venv_code == 0 {
                    fs::create_dir_all(Path::new(dir).join("bin")).expect("fake venv");
                }
                output(self.venv_code, "")
            }
            ["-m", "pip", "install", "--upgrade", "pip"] => output(self.pip_upgrade_code, ""),
            ["-m", "pip", "show", name] => {
                let installed = self.installed.lock().expect("installed");
                let normalized = normalize_name(name);
                if installed.contains(&normalized) {
                    output(0, &format!("Name: {normalized}\nVersion: 1.0\n"))
                } else {
                    output(1, "")
                }
            }
            ["-m", "pip", "install", requirement, "--no-cache-dir"] => {
                let name = requirement.split("==").next().unwrap_or_default();
                let normalized = normalize_name(name);
                if self.failing.contains(&normalized) {
                    output(1, "")
                } else {
                    self.installed.lock().expect("installed").insert(normalized);
                    output(0, "")
                }
            }
            _ => output(0, ""),
        }
    }
}

fn output(code: i32, stdout: &str) -> RunOutput {
    RunOutput {
        code,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

impl PythonRuntime for FakePython {
    fn detect_interpreter(&self, explicit: Option<&str>) -> Result<String> {
        Ok(explicit.unwrap_or("/usr/bin/python3").to_string())
    }

    fn probe(&self, _python: &str) -> Result<InterpreterInfo> {
        *self.probes.lock().expect("probes") += 1;
        self.info.clone().ok_or_else(|| anyhow!("probe failed"))
    }

    fn run_command(
        &self,
        _python: &str,
        args: &[String],
        _env: &[(String, String)],
        _cwd: &Path,
    ) -> Result<RunOutput> {
        Ok(self.respond(args))
    }

    fn run_command_passthrough(
        &self,
        _python: &str,
        args: &[String],
        _env: &[(String, String)],
        _cwd: &Path,
    ) -> Result<RunOutput> {
        Ok(self.respond(args))
    }
}

#[derive(Default)]
pub(crate) struct FakeProcess {
    fail: bool,
    restarts: Mutex<Vec<RestartRequest>>,
}

impl FakeProcess {
    pub(crate) fn restarts(&self) -> Vec<RestartRequest> {
        self.restarts.lock().expect("restarts").clone()
    }
}

impl ProcessControl for FakeProcess {
    fn restart(&self, request: &RestartRequest) -> Result<()> {
        if self.fail {
            return Err(anyhow!("exec failed"));
        }
        self.restarts.lock().expect("restarts").push(request.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakePrompt {
    answers: Mutex<VecDeque<String>>,
    questions: Mutex<Vec<String>>,
    shown: Mutex<Vec<String>>,
}

impl FakePrompt {
    pub(crate) fn questions(&self) -> Vec<String> {
        self.questions.lock().expect("questions").clone()
    }

    pub(crate) fn shown(&self) -> Vec<String> {
        self.shown.lock().expect("shown").clone()
    }
}

impl Prompt for FakePrompt {
    fn ask(&self, message: &str) -> Result<String> {
        self.questions
            .lock()
            .expect("questions")
            .push(message.to_string());
        self.answers
            .lock()
            .expect("answers")
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted answer for {message:?}"))
    }

    fn show(&self, message: &str) {
        self.shown.lock().expect("shown").push(message.to_string());
    }
}

pub(crate) struct FakeHost;

impl FakeHost {
    pub(crate) fn facts() -> HostFacts {
        HostFacts {
            os_name: "Linux".into(),
            os_release: "6.8.0".into(),
            os_version: "24.04".into(),
            hostname: "docdit-test".into(),
            machine: "x86_64".into(),
            processor: String::new(),
            logical_cpus: 8,
            total_memory_bytes: 16 * 1024 * 1024 * 1024,
            free_disk_bytes: 5 * 1024 * 1024 * 1024 + 512 * 1024 * 1024,
        }
    }
}

impl HostProbe for FakeHost {
    fn host_facts(&self, _disk_path: &Path) -> HostFacts {
        Self::facts()
    }
}

pub(crate) struct FakeEffects {
    pub(crate) python: FakePython,
    pub(crate) process: FakeProcess,
    pub(crate) prompt: FakePrompt,
    host: FakeHost,
}

impl FakeEffects {
    pub(crate) fn new(python: FakePython) -> Self {
        Self {
            python,
            process: FakeProcess::default(),
            prompt: FakePrompt::default(),
            host: FakeHost,
        }
    }

    pub(crate) fn failing_restart(mut self) -> Self {
        self.process.fail = true;
        self
    }

    pub(crate) fn answers(self, answers: &[&str]) -> Self {
        {
            let mut queue = self.prompt.answers.lock().expect("answers");
            queue.extend(answers.iter().map(|answer| (*answer).to_string()));
        }
        self
    }
}

impl Effects for FakeEffects {
    fn python(&self) -> &dyn PythonRuntime {
        &self.python
    }

    fn process(&self) -> &dyn ProcessControl {
        &self.process
    }

    fn prompt(&self) -> &dyn Prompt {
        &self.prompt
    }

    fn host(&self) -> &dyn HostProbe {
        &self.host
    }
}
