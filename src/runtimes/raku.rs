//! Rakudo Star-less compiler builds from rakudo.org

use anyhow::Result;
use serde::Deserialize;

use super::common::limit;
use super::provider::{Release, Session, VersionProvider};
use crate::core::archive::ArchiveFormat;
use crate::core::platform::OsArch;
use crate::core::{Language, TinyenvError};

pub const RAKUDO_URL: &str = "https://rakudo.org/dl/rakudo";

pub const OS_ARCH: OsArch = OsArch {
    linux: "linux",
    darwin: "macos",
    amd64: "x86_64",
    arm64: "arm64",
};

#[derive(Debug, Clone, Deserialize)]
struct RakudoEntry {
    #[serde(rename = "type")]
    kind: String,
    platform: String,
    arch: String,
    ver: String,
    build_rev: u32,
    url: String,
}

/// An installable build and where it lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RakuAsset {
    pub version: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct RakuProvider {
    index_url: String,
}

impl Default for RakuProvider {
    fn default() -> Self {
        Self::with_index(RAKUDO_URL)
    }
}

impl RakuProvider {
    pub fn with_index(index_url: &str) -> Self {
        Self {
            index_url: index_url.to_string(),
        }
    }

    /// Archives for the session's platform, newest first
    pub async fn assets(&self, session: &Session) -> Result<Vec<RakuAsset>> {
        let body = session.fetcher.get_text(&self.index_url).await?;
        let (os, arch) = session.platform.resolve(&OS_ARCH);
        parse_assets(&body, os, arch)
    }
}

pub fn parse_assets(body: &str, os: &str, arch: &str) -> Result<Vec<RakuAsset>> {
    let entries: Vec<RakudoEntry> = serde_json::from_str(body)?;
    let mut assets: Vec<RakuAsset> = entries
        .into_iter()
        .filter(|e| e.kind == "archive" && e.platform == os && e.arch == arch)
        .map(|e| RakuAsset {
            version: format!("{}.{}", e.ver, e.build_rev),
            url: e.url,
        })
        .collect();
    // Plain string order; rakudo versions are `YYYY.MM` so this is chronological
    assets.sort_by(|a, b| b.version.cmp(&a.version));
    Ok(assets)
}

impl VersionProvider for RakuProvider {
    fn language(&self) -> Language {
        Language::Raku
    }

    async fn list(&self, session: &Session, all: bool) -> Result<Vec<String>> {
        let versions = self
            .assets(session)
            .await?
            .into_iter()
            .map(|a| a.version)
            .collect();
        Ok(limit(versions, all))
    }

    async fn release(&self, session: &Session, version: &str) -> Result<Release> {
        let asset = self
            .assets(session)
            .await?
            .into_iter()
            .find(|a| a.version == version)
            .ok_or_else(|| TinyenvError::InvalidVersion(version.to_string()))?;
        Ok(Release::new(version, asset.url, ArchiveFormat::TarGz))
    }

    async fn latest_release(&self, session: &Session) -> Result<Release> {
        let asset = self
            .assets(session)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TinyenvError::NoLatest(Language::Raku.to_string()))?;
        Ok(Release::new(asset.version, asset.url, ArchiveFormat::TarGz))
    }

    fn bin_dirs(&self) -> &'static [&'static str] {
        &["bin", "share/perl6/site/bin"]
    }
}
