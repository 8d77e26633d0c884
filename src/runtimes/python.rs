//! Standalone CPython builds from astral-sh/python-build-standalone
//!
//! Identifiers pair the interpreter version with the release tag that built
//! it, e.g. `3.12.5+20240814`, since the same interpreter ships in many tags.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::common::{dedupe, limit, sort_descending};
use super::github::GithubRepo;
use super::provider::{Release, Session, VersionProvider};
use crate::core::archive::ArchiveFormat;
use crate::core::platform::OsArch;
use crate::core::{Language, TinyenvError};

pub const PYTHON_REPO: &str = "astral-sh/python-build-standalone";

pub const OS_ARCH: OsArch = OsArch {
    linux: "unknown-linux-gnu",
    darwin: "apple-darwin",
    amd64: "x86_64",
    arm64: "aarch64",
};

/// Newest tags worth looking into; a fresh tag may not have assets yet
const TAG_ATTEMPTS: usize = 2;

#[allow(clippy::expect_used)] // Static pattern
static INSTALL_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"cpython-(.+?)(?:\+|%2B).*-install_only\.tar\.gz$").expect("valid regex")
});

#[derive(Debug, Clone)]
pub struct PythonProvider {
    repo: GithubRepo,
}

impl Default for PythonProvider {
    fn default() -> Self {
        Self::with_repo(GithubRepo::new(PYTHON_REPO))
    }
}

impl PythonProvider {
    pub const fn with_repo(repo: GithubRepo) -> Self {
        Self { repo }
    }
}

/// `<pyver>+<tag>` for every install-only asset of one tag
pub fn versions_from_assets(assets: &[String], tag: &str) -> Vec<String> {
    let versions = assets
        .iter()
        .filter_map(|asset| INSTALL_ONLY.captures(asset))
        .map(|c| format!("{}+{tag}", &c[1]));
    let mut versions = dedupe(versions);
    sort_descending(&mut versions);
    versions
}

impl VersionProvider for PythonProvider {
    fn language(&self) -> Language {
        Language::Python
    }

    async fn list(&self, session: &Session, all: bool) -> Result<Vec<String>> {
        let tags = self.repo.tags(&session.fetcher).await?;
        for tag in tags.iter().take(TAG_ATTEMPTS) {
            let assets = self.repo.assets(&session.fetcher, tag).await?;
            let versions = versions_from_assets(&assets, tag);
            if versions.is_empty() {
                tracing::debug!(tag = %tag, "no install_only assets yet");
                continue;
            }
            return Ok(limit(versions, all));
        }
        Err(TinyenvError::NoAsset {
            language: Language::Python.to_string(),
            platform: session.platform.to_string(),
        }
        .into())
    }

    async fn latest(&self, session: &Session) -> Result<String> {
        self.list(session, true)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TinyenvError::NoLatest(Language::Python.to_string()).into())
    }

    fn validate(&self, version: &str) -> Result<()> {
        if version.contains('+') {
            Ok(())
        } else {
            Err(TinyenvError::InvalidVersion(version.to_string()).into())
        }
    }

    async fn release(&self, session: &Session, version: &str) -> Result<Release> {
        let Some((python, tag)) = version.split_once('+') else {
            return Err(TinyenvError::InvalidVersion(version.to_string()).into());
        };
        let (os, arch) = session.platform.resolve(&OS_ARCH);
        let url = format!(
            "{}/releases/download/{tag}/cpython-{python}+{tag}-{arch}-{os}-install_only.tar.gz",
            self.repo.url()
        );
        Ok(Release::new(version, url, ArchiveFormat::TarGz))
    }
}
