//! External `tinyenv-<command>` plugins
//!
//! An unknown per-language command is looked up as an executable on `PATH`
//! and run as `tinyenv-<command> <language> <command> <args...>` with
//! `TINYENV_ROOT` pointing at the resolved root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::paths::ROOT_ENV;
use crate::core::{Language, TinyenvError};

/// Executable name for a plugin command
pub fn plugin_name(command: &str) -> String {
    format!("tinyenv-{command}")
}

/// Locate the plugin for `command`
pub fn find_plugin(command: &str) -> Result<PathBuf> {
    which::which(plugin_name(command))
        .map_err(|_| TinyenvError::InvalidCommand(command.to_string()).into())
}

/// Run the plugin for `args[0]`, passing the language and the full argv
pub async fn run(root: &Path, language: Language, args: &[String]) -> Result<()> {
    let Some((command, rest)) = args.split_first() else {
        return Err(TinyenvError::InvalidCommand(String::new()).into());
    };
    let plugin = find_plugin(command)?;
    tracing::debug!(plugin = %plugin.display(), "running plugin");

    let status = tokio::process::Command::new(&plugin)
        .arg(language.name())
        .arg(command)
        .args(rest)
        .env(ROOT_ENV, root)
        .status()
        .await
        .with_context(|| format!("Failed to run {}", plugin.display()))?;

    if !status.success() {
        return Err(TinyenvError::Plugin {
            plugin: plugin_name(command),
            status,
        }
        .into());
    }
    Ok(())
}
