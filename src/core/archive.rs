//! Archive extraction through the host's tar
//!
//! Extraction never merges into an existing directory: the target must not
//! exist beforehand.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};

use super::error::TinyenvError;
use super::platform::{Os, Platform};

/// Cached archive formats, in the order `reset` probes for them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
}

impl ArchiveFormat {
    pub const ALL: [Self; 2] = [Self::TarGz, Self::TarXz];

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::TarXz => "tar.xz",
        }
    }
}

/// How a provider's archives are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Leading path components to drop
    pub strip: usize,
    /// On macOS the real root lives under `Contents/Home`
    pub bundle_home: bool,
}

impl ArchiveLayout {
    pub const STRIP_ONE: Self = Self {
        strip: 1,
        bundle_home: false,
    };

    pub const STRIP_TWO: Self = Self {
        strip: 2,
        bundle_home: false,
    };

    pub const BUNDLE: Self = Self {
        strip: 1,
        bundle_home: true,
    };
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self::STRIP_ONE
    }
}

fn find_tar() -> Result<PathBuf> {
    which::which("gtar")
        .or_else(|_| which::which("tar"))
        .map_err(|_| TinyenvError::MissingTar.into())
}

async fn ensure_absent(target_dir: &Path) -> Result<()> {
    if tokio::fs::try_exists(target_dir).await.unwrap_or(true) {
        let version = target_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(TinyenvError::AlreadyExists {
            version,
            path: target_dir.to_path_buf(),
        }
        .into());
    }
    Ok(())
}

/// Extract `archive` into `target_dir`, dropping `strip` leading components
pub async fn untar(archive: &Path, target_dir: &Path, strip: usize) -> Result<()> {
    ensure_absent(target_dir).await?;
    let tar = find_tar()?;
    tokio::fs::create_dir_all(target_dir)
        .await
        .with_context(|| format!("Failed to create {}", target_dir.display()))?;

    tracing::debug!(tar = %tar.display(), archive = %archive.display(), strip, "extracting");
    let status = tokio::process::Command::new(&tar)
        .arg("xf")
        .arg(archive)
        .arg("-C")
        .arg(target_dir)
        .arg(format!("--strip-components={strip}"))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .with_context(|| format!("Failed to run {}", tar.display()))?;

    if !status.success() {
        return Err(TinyenvError::Extract {
            archive: archive.to_path_buf(),
            status,
        }
        .into());
    }
    Ok(())
}

/// Extract with the provider's layout, applying the macOS bundle fixup
pub async fn extract(
    archive: &Path,
    target_dir: &Path,
    layout: ArchiveLayout,
    platform: Platform,
) -> Result<()> {
    ensure_absent(target_dir).await?;
    if !layout.bundle_home || platform.os == Os::Linux {
        return untar(archive, target_dir, layout.strip).await;
    }

    let mut staging = target_dir.as_os_str().to_owned();
    staging.push("_tmp");
    let staging = PathBuf::from(staging);
    if staging.exists() {
        tokio::fs::remove_dir_all(&staging).await?;
    }

    let result = async {
        untar(archive, &staging, layout.strip).await?;
        let home = staging.join("Contents").join("Home");
        tokio::fs::rename(&home, target_dir)
            .await
            .with_context(|| format!("Failed to move {} to {}", home.display(), target_dir.display()))
    }
    .await;

    let _ = tokio::fs::remove_dir_all(&staging).await;
    result
}
