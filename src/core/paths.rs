//! Root resolution and the on-disk layout under it.
//!
//! ```text
//! <root>/bin/<exe>                      shims
//! <root>/<lang>/version                 active version pointer
//! <root>/<lang>/versions/<id>/          installed trees
//! <root>/<lang>/cache/<id>.<ext>        downloaded archives
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::archive::ArchiveFormat;
use super::types::Language;

/// Environment variable that overrides the root directory
pub const ROOT_ENV: &str = "TINYENV_ROOT";

/// Resolve the root: `TINYENV_ROOT`, else two levels above the executable
pub fn resolve_root() -> Result<PathBuf> {
    let root = match std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
        Some(root) => PathBuf::from(root),
        None => {
            let exe = std::env::current_exe().context("Failed to locate the running executable")?;
            exe.parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .with_context(|| format!("Cannot derive root from {}", exe.display()))?
        }
    };
    std::path::absolute(&root).with_context(|| format!("Invalid root {}", root.display()))
}

/// Shared shim directory
#[must_use]
pub fn shared_bin_dir(root: &Path) -> PathBuf {
    root.join("bin")
}

/// Paths owned by one language under the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePaths {
    root: PathBuf,
}

impl LanguagePaths {
    #[must_use]
    pub fn new(root: &Path, language: Language) -> Self {
        Self {
            root: root.join(language.name()),
        }
    }

    /// `<root>/<lang>`
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn version_file(&self) -> PathBuf {
        self.root.join("version")
    }

    #[must_use]
    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    #[must_use]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions_dir().join(version)
    }

    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    #[must_use]
    pub fn cache_file(&self, version: &str, format: ArchiveFormat) -> PathBuf {
        self.cache_dir()
            .join(format!("{version}.{}", format.extension()))
    }

    /// The shared bin directory next to every language root
    #[must_use]
    pub fn shared_bin_dir(&self) -> PathBuf {
        self.root
            .parent()
            .map_or_else(|| PathBuf::from("bin"), shared_bin_dir)
    }
}
