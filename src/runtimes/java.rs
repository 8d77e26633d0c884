//! Eclipse Temurin JDKs from the Adoptium API
//!
//! Release names come from a paginated endpoint. All pages are requested at
//! once; a 404 page just means the listing ended before it.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::Result;
use futures::future::join_all;
use regex::Regex;
use serde::Deserialize;

use super::provider::{require_prefix, Release, Session, VersionProvider};
use crate::core::archive::{ArchiveFormat, ArchiveLayout};
use crate::core::platform::OsArch;
use crate::core::{Language, TinyenvError};

pub const ADOPTIUM_API: &str = "https://api.adoptium.net/v3";

pub const OS_ARCH: OsArch = OsArch {
    linux: "linux",
    darwin: "mac",
    amd64: "x64",
    arm64: "aarch64",
};

pub const PAGES: usize = 5;
pub const PAGE_SIZE: usize = 20;

const PREFIX: &str = "temurin-";

#[allow(clippy::expect_used)] // Static pattern
static MAJOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^temurin-(\d+)").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct ReleaseNames {
    releases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct JavaProvider {
    api_url: String,
}

impl Default for JavaProvider {
    fn default() -> Self {
        Self::with_api(ADOPTIUM_API)
    }
}

impl JavaProvider {
    pub fn with_api(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, session: &Session, page: usize, only_lts: bool) -> String {
        let (os, arch) = session.platform.resolve(&OS_ARCH);
        let mut url = format!(
            "{}/info/release_names?release_type=ga&os={os}&architecture={arch}&vendor=eclipse&project=jdk&page_size={PAGE_SIZE}&page={page}",
            self.api_url
        );
        if only_lts {
            url.push_str("&lts=true");
        }
        url
    }

    /// One page of release names; `None` once the API runs out of pages
    async fn fetch_page(&self, session: &Session, page: usize, only_lts: bool) -> Result<Option<Vec<String>>> {
        let url = self.page_url(session, page, only_lts);
        match session.fetcher.get_json::<ReleaseNames>(&url).await {
            Ok(names) => Ok(Some(names.releases)),
            Err(err)
                if err
                    .downcast_ref::<TinyenvError>()
                    .is_some_and(TinyenvError::is_not_found) =>
            {
                tracing::debug!(page, "no more release pages");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Every `temurin-` identifier across all pages, in API order
    pub async fn releases(&self, session: &Session, only_lts: bool) -> Result<Vec<String>> {
        let pages = join_all((0..PAGES).map(|page| self.fetch_page(session, page, only_lts))).await;

        let mut slots: Vec<Option<String>> = vec![None; PAGES * PAGE_SIZE];
        for (page, result) in pages.into_iter().enumerate() {
            let Some(names) = result? else {
                continue;
            };
            for (offset, name) in names.into_iter().take(PAGE_SIZE).enumerate() {
                slots[page * PAGE_SIZE + offset] = Some(name);
            }
        }

        Ok(slots
            .into_iter()
            .flatten()
            .filter_map(|name| name.strip_prefix("jdk-").map(|v| format!("{PREFIX}{v}")))
            .collect())
    }
}

/// Newest release of each major, majors descending
pub fn latest_per_major(versions: &[String]) -> Vec<String> {
    let mut majors: BTreeMap<u32, &String> = BTreeMap::new();
    for version in versions {
        if let Some(major) = MAJOR
            .captures(version)
            .and_then(|c| c[1].parse::<u32>().ok())
        {
            majors.entry(major).or_insert(version);
        }
    }
    majors.into_values().rev().cloned().collect()
}

impl VersionProvider for JavaProvider {
    fn language(&self) -> Language {
        Language::Java
    }

    async fn list(&self, session: &Session, all: bool) -> Result<Vec<String>> {
        let versions = self.releases(session, false).await?;
        if all {
            return Ok(versions);
        }
        Ok(latest_per_major(&versions))
    }

    /// Newest LTS release rather than newest overall
    async fn latest(&self, session: &Session) -> Result<String> {
        self.releases(session, true)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TinyenvError::NoLatest(Language::Java.to_string()).into())
    }

    fn validate(&self, version: &str) -> Result<()> {
        require_prefix(version, PREFIX)
    }

    async fn release(&self, session: &Session, version: &str) -> Result<Release> {
        let (os, arch) = session.platform.resolve(&OS_ARCH);
        let jdk = version.strip_prefix(PREFIX).unwrap_or(version);
        let url = format!(
            "{}/binary/version/jdk-{jdk}/{os}/{arch}/jdk/hotspot/normal/eclipse",
            self.api_url
        );
        Ok(Release::new(version, url, ArchiveFormat::TarGz))
    }

    fn layout(&self) -> ArchiveLayout {
        ArchiveLayout::BUNDLE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use crate::core::http::Fetcher;
    use crate::core::platform::{Arch, Os, Platform};
    use mockito::Matcher;

    fn session() -> Session {
        Session::new(
            Fetcher::new(&HttpSettings::default()).unwrap(),
            Platform::new(Os::Linux, Arch::Amd64),
        )
    }

    fn page_body(names: &[&str]) -> String {
        serde_json::json!({ "releases": names }).to_string()
    }

    async fn mock_page(server: &mut mockito::ServerGuard, page: usize, status: usize, body: String) -> mockito::Mock {
        server
            .mock("GET", "/v3/info/release_names")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), page.to_string()),
                Matcher::UrlEncoded("os".into(), "linux".into()),
                Matcher::UrlEncoded("architecture".into(), "x64".into()),
            ]))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_missing_page_ends_listing_without_error() {
        let mut server = mockito::Server::new_async().await;
        let _p0 = mock_page(&mut server, 0, 200, page_body(&["jdk-22.0.2+9", "jdk-22.0.1+8"])).await;
        let _p1 = mock_page(&mut server, 1, 200, page_body(&["jdk-21.0.4+7"])).await;
        let _p2 = mock_page(&mut server, 2, 200, page_body(&["jdk-17.0.12+7", "jdk8u422-b05"])).await;
        let _p3 = mock_page(&mut server, 3, 404, String::new()).await;
        let _p4 = mock_page(&mut server, 4, 200, page_body(&["jdk-11.0.24+8"])).await;

        let provider = JavaProvider::with_api(&format!("{}/v3", server.url()));
        let versions = provider.list(&session(), true).await.unwrap();
        assert_eq!(
            versions,
            [
                "temurin-22.0.2+9",
                "temurin-22.0.1+8",
                "temurin-21.0.4+7",
                "temurin-17.0.12+7",
                "temurin-11.0.24+8",
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_page_fails_listing() {
        let mut server = mockito::Server::new_async().await;
        let _p0 = mock_page(&mut server, 0, 200, page_body(&["jdk-22.0.2+9"])).await;
        let _p1 = mock_page(&mut server, 1, 500, String::new()).await;
        let mut _rest = Vec::new();
        for page in 2..PAGES {
            _rest.push(mock_page(&mut server, page, 404, String::new()).await);
        }

        let provider = JavaProvider::with_api(&format!("{}/v3", server.url()));
        let err = provider.list(&session(), true).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TinyenvError>(),
            Some(TinyenvError::Http { status, .. }) if status.as_u16() == 500
        ));
    }

    #[tokio::test]
    async fn test_latest_uses_lts_listing() {
        let mut server = mockito::Server::new_async().await;
        let _lts = server
            .mock("GET", "/v3/info/release_names")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("lts".into(), "true".into()),
                Matcher::UrlEncoded("page".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(page_body(&["jdk-21.0.4+7", "jdk-17.0.12+7"]))
            .create_async()
            .await;
        let mut _rest = Vec::new();
        for page in 1..PAGES {
            let mock = server
                .mock("GET", "/v3/info/release_names")
                .match_query(Matcher::AllOf(vec![
                    Matcher::UrlEncoded("lts".into(), "true".into()),
                    Matcher::UrlEncoded("page".into(), page.to_string()),
                ]))
                .with_status(404)
                .create_async()
                .await;
            _rest.push(mock);
        }

        let provider = JavaProvider::with_api(&format!("{}/v3", server.url()));
        assert_eq!(provider.latest(&session()).await.unwrap(), "temurin-21.0.4+7");
    }

    #[test]
    fn test_latest_per_major() {
        let versions: Vec<String> = [
            "temurin-22.0.2+9",
            "temurin-22.0.1+8",
            "temurin-8.0.422+5",
            "temurin-21.0.4+7",
            "temurin-21.0.3+9",
        ]
        .map(String::from)
        .to_vec();
        assert_eq!(
            latest_per_major(&versions),
            ["temurin-22.0.2+9", "temurin-21.0.4+7", "temurin-8.0.422+5"]
        );
    }

    #[test]
    fn test_validate_requires_prefix() {
        let provider = JavaProvider::default();
        assert!(provider.validate("temurin-21.0.4+7").is_ok());
        let err = provider.validate("21").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TinyenvError>(),
            Some(TinyenvError::InvalidVersion(v)) if v == "21"
        ));
    }

    #[tokio::test]
    async fn test_release_url_and_layout() {
        let provider = JavaProvider::default();
        let s = Session::new(
            Fetcher::new(&HttpSettings::default()).unwrap(),
            Platform::new(Os::Darwin, Arch::Arm64),
        );
        let release = provider.release(&s, "temurin-21.0.4+7").await.unwrap();
        assert_eq!(
            release.url,
            "https://api.adoptium.net/v3/binary/version/jdk-21.0.4+7/mac/aarch64/jdk/hotspot/normal/eclipse"
        );
        assert!(provider.layout().bundle_home);
    }
}
