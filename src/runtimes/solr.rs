//! Apache Solr releases
//!
//! Versions come from the archive's directory listing. Current releases are
//! also on the faster downloads mirror, which is tried first.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::common::limit;
use super::provider::{Release, Session, VersionProvider};
use crate::core::archive::ArchiveFormat;
use crate::core::{Language, TinyenvError};

pub const SOLR_ARCHIVE_URL: &str = "https://archive.apache.org/dist/solr/solr";
pub const SOLR_MIRROR_URL: &str = "https://downloads.apache.org/solr/solr";

#[allow(clippy::expect_used)] // Static pattern
static VERSION_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="([\d.]+)/">"#).expect("valid regex"));

#[derive(Debug, Clone)]
pub struct SolrProvider {
    archive_url: String,
    mirror_url: String,
}

impl Default for SolrProvider {
    fn default() -> Self {
        Self::with_urls(SOLR_ARCHIVE_URL, SOLR_MIRROR_URL)
    }
}

impl SolrProvider {
    pub fn with_urls(archive_url: &str, mirror_url: &str) -> Self {
        Self {
            archive_url: archive_url.trim_end_matches('/').to_string(),
            mirror_url: mirror_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Version directories of the listing, newest first
pub fn parse_listing(html: &str) -> Vec<String> {
    let mut versions: Vec<String> = VERSION_DIR
        .captures_iter(html)
        .map(|c| c[1].to_string())
        .collect();
    versions.reverse();
    versions
}

impl VersionProvider for SolrProvider {
    fn language(&self) -> Language {
        Language::Solr
    }

    async fn list(&self, session: &Session, all: bool) -> Result<Vec<String>> {
        let html = session
            .fetcher
            .get_text(&format!("{}/", self.archive_url))
            .await?;
        let versions = parse_listing(&html);
        if versions.is_empty() {
            return Err(TinyenvError::NoLatest(Language::Solr.to_string()).into());
        }
        Ok(limit(versions, all))
    }

    async fn release(&self, session: &Session, version: &str) -> Result<Release> {
        let fast = format!("{}/{version}/solr-{version}.tgz", self.mirror_url);
        let url = match session.fetcher.head(&fast).await {
            Ok(()) => fast,
            Err(err) => {
                tracing::debug!(error = %err, "falling back to archive.apache.org");
                format!("{}/{version}/solr-{version}.tgz", self.archive_url)
            }
        };
        Ok(Release::new(version, url, ArchiveFormat::TarGz))
    }
}
