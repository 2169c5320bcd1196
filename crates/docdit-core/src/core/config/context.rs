use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::config::{Config, EnvSnapshot, GlobalOptions};
use crate::core::provision::probe;
use crate::core::runtime::effects::{Effects, SharedEffects};
use crate::core::secrets::ENV_FILE_NAME;
use crate::core::RECORD_FILE_NAME;

pub struct CommandContext {
    env: EnvSnapshot,
    config: Config,
    argv: Vec<OsString>,
    effects: SharedEffects,
}

impl CommandContext {
    /// Creates a command context from the live process environment.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be resolved.
    pub fn new(global: &GlobalOptions, effects: SharedEffects) -> Result<Self> {
        let env = EnvSnapshot::capture();
        let argv = env::args_os().skip(1).collect();
        Self::from_parts(global, env, argv, effects)
    }

    /// Creates a context from explicit parts; `argv` excludes the program name.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be resolved.
    pub fn from_parts(
        global: &GlobalOptions,
        env: EnvSnapshot,
        argv: Vec<OsString>,
        effects: SharedEffects,
    ) -> Result<Self> {
        let config = Config::from_snapshot(&env, global)?;
        Ok(Self {
            env,
            config,
            argv,
            effects,
        })
    }

    pub fn effects(&self) -> &dyn Effects {
        self.effects.as_ref()
    }

    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }

    pub fn base_dir(&self) -> &Path {
        self.config.base_dir()
    }

    pub fn venv_dir(&self) -> PathBuf {
        docdit_python::venv_dir(self.base_dir())
    }

    pub fn record_path(&self) -> PathBuf {
        self.base_dir().join(RECORD_FILE_NAME)
    }

    pub fn env_file_path(&self) -> PathBuf {
        self.base_dir().join(ENV_FILE_NAME)
    }

    /// The interpreter currently in charge: the override, or the first on `PATH`.
    ///
    /// # Errors
    /// Returns an error when no interpreter can be located.
    pub fn python(&self) -> Result<String> {
        self.effects
            .python()
            .detect_interpreter(self.config.python_override())
    }

    pub fn is_isolated(&self) -> bool {
        probe::is_isolated(&self.env, self.effects.python())
    }
}
