//! Release discovery for projects hosted on GitHub without using its API.
//!
//! The releases page lists tags as `/releases/tag/<tag>` links, and each tag's
//! downloads live in a separate "expanded assets" fragment.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::core::http::Fetcher;

pub const GITHUB_URL: &str = "https://github.com";

#[allow(clippy::expect_used)] // Static pattern
static HREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="(.+?)""#).expect("valid regex"));

#[allow(clippy::expect_used)] // Static pattern
static TAG_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/releases/tag/([^/]+)").expect("valid regex"));

/// A GitHub repository, addressed by web URL
#[derive(Debug, Clone)]
pub struct GithubRepo {
    /// Host used to absolutize relative links
    host: String,
    /// `<host>/<owner>/<repo>`
    url: String,
}

impl GithubRepo {
    pub fn new(owner_repo: &str) -> Self {
        Self::with_host(GITHUB_URL, owner_repo)
    }

    pub fn with_host(host: &str, owner_repo: &str) -> Self {
        let host = host.trim_end_matches('/').to_string();
        let url = format!("{host}/{owner_repo}");
        Self { host, url }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Release tags, newest first as the releases page orders them
    pub async fn tags(&self, fetcher: &Fetcher) -> Result<Vec<String>> {
        let html = fetcher.get_text(&format!("{}/releases", self.url)).await?;
        Ok(parse_tags(&html))
    }

    /// Absolute download URLs attached to `tag`
    pub async fn assets(&self, fetcher: &Fetcher, tag: &str) -> Result<Vec<String>> {
        let html = fetcher
            .get_text(&format!("{}/releases/expanded_assets/{tag}", self.url))
            .await?;
        Ok(parse_assets(&html, &self.host))
    }
}

pub fn parse_tags(html: &str) -> Vec<String> {
    HREF.captures_iter(html)
        .filter_map(|c| TAG_HREF.captures(&c[1]).map(|t| t[1].to_string()))
        .collect()
}

pub fn parse_assets(html: &str, host: &str) -> Vec<String> {
    HREF.captures_iter(html)
        .map(|c| c[1].to_string())
        .filter(|href| href.contains("/releases/download/"))
        .map(|href| {
            if href.starts_with("https") {
                href
            } else {
                format!("{host}{href}")
            }
        })
        .collect()
}
