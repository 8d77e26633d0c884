//! Per-language directory management
//!
//! Owns `<root>/<lang>/{version,versions,cache}` and drives the provider,
//! the installation pipeline and shim regeneration for one language.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::Provider;
use super::common::sort_descending;
use super::pipeline;
use super::provider::{Session, VersionProvider};
use crate::config::{RehashFilter, Settings};
use crate::core::archive::{self, ArchiveFormat};
use crate::core::paths::LanguagePaths;
use crate::core::platform::Platform;
use crate::core::{Language, TinyenvError};
use crate::shims::{self, RehashReport};

/// Argument to `reset` meaning "the active version"
pub const CURRENT: &str = "-";

#[derive(Debug, Clone)]
pub struct LanguageManager<P = Provider> {
    language: Language,
    paths: LanguagePaths,
    provider: P,
    filter: RehashFilter,
}

impl LanguageManager<Provider> {
    /// Manager backed by the language's public upstream
    #[must_use]
    pub fn new(root: &Path, language: Language, settings: &Settings) -> Self {
        Self::with_provider(
            root,
            Provider::for_language(language),
            settings.rehash_filter(language),
        )
    }
}

impl<P: VersionProvider> LanguageManager<P> {
    pub fn with_provider(root: &Path, provider: P, filter: RehashFilter) -> Self {
        let language = provider.language();
        Self {
            language,
            paths: LanguagePaths::new(root, language),
            provider,
            filter,
        }
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub const fn paths(&self) -> &LanguagePaths {
        &self.paths
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Create `versions/` so a fresh root is usable
    pub fn init(&self) -> Result<()> {
        let dir = self.paths.versions_dir();
        std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))
    }

    /// Active version, `None` when no pointer file exists
    pub fn current_version(&self) -> Result<Option<String>> {
        let path = self.paths.version_file();
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content.trim_end().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Active version; an error when none is set
    pub fn version(&self) -> Result<String> {
        self.current_version()?
            .ok_or_else(|| TinyenvError::NoVersion(self.language.to_string()).into())
    }

    /// Point the language at `version` without any checks
    pub fn set_version(&self, version: &str) -> Result<()> {
        let path = self.paths.version_file();
        std::fs::create_dir_all(self.paths.root())?;
        std::fs::write(&path, format!("{version}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Installed versions, newest first
    pub fn versions(&self) -> Result<Vec<String>> {
        let dir = self.paths.versions_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", dir.display())),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                versions.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        sort_descending(&mut versions);
        Ok(versions)
    }

    /// Activate an installed version and refresh its shims
    pub fn global(&self, version: &str) -> Result<RehashReport> {
        if !self.versions()?.iter().any(|v| v == version) {
            return Err(TinyenvError::InvalidVersion(version.to_string()).into());
        }
        self.set_version(version)?;
        self.rehash()
    }

    /// Regenerate this language's shims for the active version
    pub fn rehash(&self) -> Result<RehashReport> {
        let version = self.version()?;
        shims::rehash(
            self.language,
            &self.paths.version_dir(&version),
            self.provider.bin_dirs(),
            &self.paths.shared_bin_dir(),
            &self.filter,
        )
    }

    /// Upstream versions, newest first
    pub async fn list(&self, session: &Session, all: bool) -> Result<Vec<String>> {
        self.provider.list(session, all).await
    }

    /// Download and extract `version` (or `latest`); returns the concrete id
    pub async fn install(&self, session: &Session, version: &str) -> Result<String> {
        pipeline::install(&self.provider, session, &self.paths, version).await
    }

    /// Re-extract an installed version from its cached archive.
    ///
    /// `-` names the active version. Shims are refreshed when the reset
    /// version is the active one.
    pub async fn reset(&self, platform: Platform, version: &str) -> Result<String> {
        let current = self.current_version()?;
        let version = if version == CURRENT {
            current
                .clone()
                .ok_or_else(|| TinyenvError::NoVersion(self.language.to_string()))?
        } else {
            version.to_string()
        };

        let target = self.paths.version_dir(&version);
        if !target.is_dir() {
            return Err(TinyenvError::InvalidVersion(version).into());
        }
        let cache_file = ArchiveFormat::ALL
            .iter()
            .map(|&format| self.paths.cache_file(&version, format))
            .find(|path| path.is_file())
            .ok_or_else(|| TinyenvError::NoCacheFile(version.clone()))?;

        println!("{} Removing {}", "→".blue(), target.display());
        tokio::fs::remove_dir_all(&target)
            .await
            .with_context(|| format!("Failed to remove {}", target.display()))?;
        println!("{} Extracting {}", "→".blue(), cache_file.display());
        archive::extract(&cache_file, &target, self.provider.layout(), platform).await?;

        if current.as_deref() == Some(version.as_str()) {
            self.rehash()?;
        }
        Ok(version)
    }
}
