//! The `.env` secrets file: placeholder creation and interactive key entry.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::info;

use crate::core::runtime::effects::Prompt;

pub const ENV_FILE_NAME: &str = ".env";
pub const OPENAI_KEY: &str = "OPENAI_API_KEY";
pub const COMPANION_KEY: &str = "HUGGINGFACE_API_KEY";

const HEADER: &str = "# Environment variables";

/// Writes the placeholder `.env` when it does not exist yet.
///
/// Returns whether the file was created.
///
/// # Errors
/// Returns an error when the file cannot be written.
pub fn ensure_env_file(base_dir: &Path) -> Result<bool> {
    let path = base_dir.join(ENV_FILE_NAME);
    if path.exists() {
        info!("[=] '{ENV_FILE_NAME}' already exists");
        return Ok(false);
    }
    info!("[*] '{ENV_FILE_NAME}' not found; creating it");
    let contents = format!("{HEADER}\n{OPENAI_KEY}=\n{COMPANION_KEY}=\n");
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    info!("[✓] '{ENV_FILE_NAME}' created");
    Ok(true)
}

/// Prompts for a value and rewrites the whole `.env` with exactly two keys:
/// `key_name` set to the answer and the other known key emptied.
///
/// Any other key previously in the file is dropped.
///
/// # Errors
/// Returns an error when the prompt fails or the file cannot be written.
pub fn upsert_key(base_dir: &Path, key_name: &str, prompt: &dyn Prompt) -> Result<String> {
    let path = base_dir.join(ENV_FILE_NAME);
    let value = prompt.ask("Paste the API token for your account: ")?;
    let companion = if key_name == COMPANION_KEY {
        OPENAI_KEY
    } else {
        COMPANION_KEY
    };
    let contents = format!(
        "{HEADER}\n{key_name}={}\n{companion}=''\n",
        quote(&value)
    );
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    info!("[✓] token saved to '{}'", path.display());
    Ok(value)
}

/// Shows the stored OpenAI key and replaces it only on explicit confirmation.
///
/// # Errors
/// Returns an error when reading, prompting or writing fails.
pub fn get_or_create_key(base_dir: &Path, prompt: &dyn Prompt) -> Result<String> {
    let path = base_dir.join(ENV_FILE_NAME);
    if !path.exists() {
        return upsert_key(base_dir, OPENAI_KEY, prompt);
    }

    let current = read_env_file(&path)?
        .shift_remove(OPENAI_KEY)
        .unwrap_or_default();
    let shown = if current.is_empty() {
        "(empty)"
    } else {
        current.as_str()
    };
    prompt.show(&format!("Current {OPENAI_KEY}: {shown}"));
    let answer = prompt.ask("Replace the key? (y/n): ")?;
    if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
        return upsert_key(base_dir, OPENAI_KEY, prompt);
    }
    info!("[=] no changes made to '{}'", path.display());
    Ok(current)
}

/// Reads `KEY=value` lines in file order; comments and blanks are ignored and
/// surrounding quotes are stripped from values.
///
/// # Errors
/// Returns an error when the file cannot be read.
pub fn read_env_file(path: &Path) -> Result<IndexMap<String, String>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut values = IndexMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        values.insert(key.trim().to_string(), unquote(value.trim()).to_string());
    }
    Ok(values)
}

fn quote(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{value}\"")
    } else {
        format!("'{value}'")
    }
}

fn unquote(value: &str) -> &str {
    for mark in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(mark) && value.ends_with(mark) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
