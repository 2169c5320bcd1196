//! Per-run log session: console plus a timestamped file under `log/`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::config::GlobalOptions;

pub const LOG_DIR: &str = "log";

/// `docdit` is the binary target; its events come from `main`.
const CRATE_TARGETS: [&str; 3] = ["docdit", "docdit_core", "docdit_runtime"];

#[derive(Debug, Clone)]
pub struct LogOptions {
    pub console_level: &'static str,
    pub ansi: bool,
}

impl LogOptions {
    #[must_use]
    pub fn from_global(global: &GlobalOptions, is_tty: bool) -> Self {
        let console_level = if global.quiet {
            "warn"
        } else {
            match global.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        let env_no_color = std::env::var_os("NO_COLOR").is_some();
        Self {
            console_level,
            ansi: is_tty && !global.no_color && !env_no_color,
        }
    }
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            console_level: "info",
            ansi: false,
        }
    }
}

/// Logging handle owned by `main`; dropping it uninstalls the subscriber.
pub struct LogSession {
    path: PathBuf,
    _guard: DefaultGuard,
}

impl LogSession {
    /// Creates `<base_dir>/log/log_installer_<timestamp>.log` and routes
    /// `tracing` output to it (DEBUG) and to stdout (per `options`).
    ///
    /// # Errors
    /// Returns an error when the log directory or file cannot be created.
    pub fn start(base_dir: &Path, options: &LogOptions) -> Result<Self> {
        let log_dir = base_dir.join(LOG_DIR);
        fs::create_dir_all(&log_dir)
            .with_context(|| format!("creating {}", log_dir.display()))?;
        let path = log_dir.join(log_file_name(now())?);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;

        let console = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(options.ansi)
            .with_filter(EnvFilter::new(directives(options.console_level)));
        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_target(false)
            .with_ansi(false)
            .with_filter(EnvFilter::new(directives("debug")));
        let subscriber = tracing_subscriber::registry().with(console).with(file_layer);
        let guard = tracing::subscriber::set_default(subscriber);

        tracing::info!("[✓] log file created: {}", path.display());
        Ok(Self {
            path,
            _guard: guard,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn directives(level: &str) -> String {
    CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn log_file_name(at: OffsetDateTime) -> Result<String> {
    let stamp = at
        .format(format_description!(
            "[year]_[month]_[day]_[hour]_[minute]_[second]"
        ))
        .context("formatting log timestamp")?;
    Ok(format!("log_installer_{stamp}.log"))
}
