//! Configuration, settings, and per-command context assembly.

pub mod context;

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub(crate) const PYTHON_ENV: &str = "DOCDIT_PYTHON";
pub(crate) const BASE_DIR_ENV: &str = "DOCDIT_BASE_DIR";
pub(crate) const RESTARTED_ENV: &str = "DOCDIT_RESTARTED";
pub(crate) const VIRTUAL_ENV: &str = "VIRTUAL_ENV";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub no_color: bool,
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    #[must_use]
    pub fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    #[must_use]
    pub fn flag_is_enabled(&self, key: &str) -> bool {
        matches!(self.vars.get(key).map(String::as_str), Some("1"))
    }

    #[must_use]
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    #[must_use]
    pub fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) base_dir: PathBuf,
    pub(crate) python_override: Option<String>,
    pub(crate) restarted: bool,
}

impl Config {
    /// Builds a configuration from the environment snapshot and CLI options.
    ///
    /// The base directory comes from `--base-dir`, then `DOCDIT_BASE_DIR`,
    /// then the working directory.
    ///
    /// # Errors
    /// Returns an error if the working directory cannot be read.
    pub fn from_snapshot(snapshot: &EnvSnapshot, global: &GlobalOptions) -> Result<Self> {
        let base_dir = match (&global.base_dir, snapshot.var(BASE_DIR_ENV)) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(value)) if !value.trim().is_empty() => PathBuf::from(value),
            _ => env::current_dir().context("reading the current directory")?,
        };
        Ok(Self {
            base_dir,
            python_override: snapshot
                .var(PYTHON_ENV)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned),
            restarted: snapshot.flag_is_enabled(RESTARTED_ENV),
        })
    }

    #[must_use]
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    #[must_use]
    pub fn python_override(&self) -> Option<&str> {
        self.python_override.as_deref()
    }

    #[must_use]
    pub fn restarted(&self) -> bool {
        self.restarted
    }
}
