//! Node.js versions from nodejs.org

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;

use super::common::{limit, parse_semver};
use super::provider::{Release, Session, VersionProvider};
use crate::core::archive::ArchiveFormat;
use crate::core::platform::OsArch;
use crate::core::{Language, TinyenvError};

pub const NODE_DIST_URL: &str = "https://nodejs.org/dist";

pub const OS_ARCH: OsArch = OsArch {
    linux: "linux",
    darwin: "darwin",
    amd64: "x64",
    arm64: "arm64",
};

/// One row of `index.json`
#[derive(Debug, Clone, Deserialize)]
pub struct NodeVersion {
    pub version: String,
    /// `false` or the LTS codename
    #[serde(default)]
    pub lts: serde_json::Value,
}

impl NodeVersion {
    #[must_use]
    pub fn is_lts(&self) -> bool {
        self.lts.is_string()
    }
}

#[derive(Debug, Clone)]
pub struct NodeProvider {
    dist_url: String,
}

impl Default for NodeProvider {
    fn default() -> Self {
        Self::with_dist(NODE_DIST_URL)
    }
}

impl NodeProvider {
    pub fn with_dist(dist_url: &str) -> Self {
        Self {
            dist_url: dist_url.trim_end_matches('/').to_string(),
        }
    }

    async fn index(&self, session: &Session) -> Result<Vec<NodeVersion>> {
        session
            .fetcher
            .get_json(&format!("{}/index.json", self.dist_url))
            .await
    }
}

/// Newest release of each major line; the index is already newest first
pub fn newest_per_major(versions: &[NodeVersion]) -> Vec<String> {
    let mut majors: BTreeMap<u64, &str> = BTreeMap::new();
    for v in versions {
        if let Some(parsed) = parse_semver(&v.version) {
            majors.entry(parsed.major).or_insert(&v.version);
        }
    }
    let newest = majors.into_values().rev().map(ToString::to_string).collect();
    limit(newest, false)
}

impl VersionProvider for NodeProvider {
    fn language(&self) -> Language {
        Language::Node
    }

    async fn list(&self, session: &Session, all: bool) -> Result<Vec<String>> {
        let index = self.index(session).await?;
        if all {
            return Ok(index.into_iter().map(|v| v.version).collect());
        }
        Ok(newest_per_major(&index))
    }

    async fn latest(&self, session: &Session) -> Result<String> {
        self.index(session)
            .await?
            .into_iter()
            .find(NodeVersion::is_lts)
            .map(|v| v.version)
            .ok_or_else(|| TinyenvError::NoLatest(Language::Node.to_string()).into())
    }

    async fn release(&self, session: &Session, version: &str) -> Result<Release> {
        let (os, arch) = session.platform.resolve(&OS_ARCH);
        let url = format!("{}/{version}/node-{version}-{os}-{arch}.tar.xz", self.dist_url);
        Ok(Release::new(version, url, ArchiveFormat::TarXz))
    }
}
