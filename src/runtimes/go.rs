//! Go versions from go.dev

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;

use super::common::limit;
use super::provider::{Release, Session, VersionProvider};
use crate::core::archive::ArchiveFormat;
use crate::core::platform::OsArch;
use crate::core::Language;

pub const GO_VERSIONS_URL: &str = "https://go.dev/dl/?mode=json&include=all";
pub const GO_DOWNLOAD_URL: &str = "https://dl.google.com/go";

pub const OS_ARCH: OsArch = OsArch {
    linux: "linux",
    darwin: "darwin",
    amd64: "amd64",
    arm64: "arm64",
};

#[allow(clippy::expect_used)] // Static pattern
static STABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid regex"));

/// Go version info from go.dev
#[derive(Debug, Clone, Deserialize)]
pub struct GoVersion {
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct GoProvider {
    versions_url: String,
    download_url: String,
}

impl Default for GoProvider {
    fn default() -> Self {
        Self::with_urls(GO_VERSIONS_URL, GO_DOWNLOAD_URL)
    }
}

impl GoProvider {
    pub fn with_urls(versions_url: &str, download_url: &str) -> Self {
        Self {
            versions_url: versions_url.to_string(),
            download_url: download_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Recent listing keeps only final releases (`1.22.0`, not `1.23rc1`)
pub fn select(versions: Vec<GoVersion>, all: bool) -> Vec<String> {
    let versions = versions
        .into_iter()
        .map(|v| v.version.trim_start_matches("go").to_string());
    if all {
        return versions.collect();
    }
    limit(versions.filter(|v| STABLE.is_match(v)).collect(), false)
}

impl VersionProvider for GoProvider {
    fn language(&self) -> Language {
        Language::Go
    }

    async fn list(&self, session: &Session, all: bool) -> Result<Vec<String>> {
        let versions: Vec<GoVersion> = session.fetcher.get_json(&self.versions_url).await?;
        Ok(select(versions, all))
    }

    async fn release(&self, session: &Session, version: &str) -> Result<Release> {
        let (os, arch) = session.platform.resolve(&OS_ARCH);
        let url = format!("{}/go{version}.{os}-{arch}.tar.gz", self.download_url);
        Ok(Release::new(version, url, ArchiveFormat::TarGz))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use crate::core::http::Fetcher;
    use crate::core::platform::{Arch, Os, Platform};

    fn session(platform: Platform) -> Session {
        Session::new(Fetcher::new(&HttpSettings::default()).unwrap(), platform)
    }

    fn go_versions(names: &[&str]) -> Vec<GoVersion> {
        names
            .iter()
            .map(|v| GoVersion {
                version: (*v).to_string(),
            })
            .collect()
    }

    #[test]
    fn test_select_recent_filters_unstable() {
        let versions = go_versions(&["go1.23rc1", "go1.22.0", "go1.21", "go1.21.5"]);
        assert_eq!(select(versions, false), ["1.22.0", "1.21.5"]);
    }

    #[test]
    fn test_select_all_keeps_everything() {
        let versions = go_versions(&["go1.23rc1", "go1.22.0"]);
        assert_eq!(select(versions, true), ["1.23rc1", "1.22.0"]);
    }

    #[test]
    fn test_select_recent_is_bounded() {
        let names: Vec<String> = (0..20).map(|i| format!("go1.{i}.0")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(select(go_versions(&refs), false).len(), 10);
    }

    #[tokio::test]
    async fn test_release_url() {
        let provider = GoProvider::default();
        let release = provider
            .release(&session(Platform::new(Os::Darwin, Arch::Arm64)), "1.22.0")
            .await
            .unwrap();
        assert_eq!(release.url, "https://dl.google.com/go/go1.22.0.darwin-arm64.tar.gz");
        assert_eq!(release.format, ArchiveFormat::TarGz);
    }

    #[tokio::test]
    async fn test_list_and_latest_from_server() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/dl/index.json")
            .with_status(200)
            .with_body(r#"[{"version":"go1.22.0","stable":true},{"version":"go1.21.5","stable":true}]"#)
            .create_async()
            .await;

        let provider = GoProvider::with_urls(&format!("{}/dl/index.json", server.url()), &server.url());
        let s = session(Platform::new(Os::Linux, Arch::Amd64));
        assert_eq!(provider.list(&s, false).await.unwrap(), ["1.22.0", "1.21.5"]);
        assert_eq!(provider.latest(&s).await.unwrap(), "1.22.0");
    }
}
