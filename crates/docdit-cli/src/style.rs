use std::env;

use color_eyre::owo_colors::OwoColorize;
use docdit_core::CommandStatus;

/// Terminal rendering for the final outcome line; uses the same bracket
/// markers as the installer log.
pub struct Style {
    colored: bool,
}

impl Style {
    pub fn new(no_color_flag: bool, stdout_is_tty: bool) -> Self {
        let no_color_env = env::var_os("NO_COLOR").is_some();
        Self {
            colored: stdout_is_tty && !no_color_flag && !no_color_env,
        }
    }

    pub fn status(&self, status: &CommandStatus, text: &str) -> String {
        let marker = marker(status);
        if !self.colored {
            return format!("{marker} {text}");
        }
        let marker = match status {
            CommandStatus::Ok => marker.green().bold().to_string(),
            CommandStatus::UserError => marker.yellow().bold().to_string(),
            CommandStatus::Failure => marker.red().bold().to_string(),
        };
        format!("{marker} {text}")
    }

    pub fn hint(&self, text: &str) -> String {
        let line = format!("[→] Hint: {text}");
        if self.colored {
            line.dimmed().to_string()
        } else {
            line
        }
    }
}

fn marker(status: &CommandStatus) -> &'static str {
    match status {
        CommandStatus::Ok => "[✓]",
        CommandStatus::UserError => "[!]",
        CommandStatus::Failure => "[✗]",
    }
}
