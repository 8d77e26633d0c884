//! Relocatable Perl builds published by skaji/relocatable-perl

use anyhow::{Context, Result};

use super::common::{dedupe, limit};
use super::provider::{require_prefix, Release, Session, VersionProvider};
use crate::core::archive::ArchiveFormat;
use crate::core::platform::OsArch;
use crate::core::{Language, TinyenvError};

pub const PERL_RELEASES_CSV: &str =
    "https://raw.githubusercontent.com/skaji/relocatable-perl/main/releases.csv";
pub const PERL_DOWNLOAD_URL: &str = "https://github.com/skaji/relocatable-perl/releases/download";

pub const OS_ARCH: OsArch = OsArch {
    linux: "linux",
    darwin: "darwin",
    amd64: "amd64",
    arm64: "arm64",
};

const PREFIX: &str = "relocatable-";

#[derive(Debug, Clone)]
pub struct PerlProvider {
    releases_url: String,
    download_url: String,
}

impl Default for PerlProvider {
    fn default() -> Self {
        Self::with_urls(PERL_RELEASES_CSV, PERL_DOWNLOAD_URL)
    }
}

impl PerlProvider {
    pub fn with_urls(releases_url: &str, download_url: &str) -> Self {
        Self {
            releases_url: releases_url.to_string(),
            download_url: download_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Versions built for `os`/`arch`, in feed order, without repeats
pub fn parse_releases(csv_text: &str, os: &str, arch: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let mut versions = Vec::new();
    for record in reader.records() {
        let record = record.context("malformed releases.csv")?;
        if record.get(1) == Some(os) && record.get(2) == Some(arch) {
            if let Some(version) = record.get(0) {
                versions.push(format!("{PREFIX}{version}"));
            }
        }
    }
    Ok(dedupe(versions))
}

impl VersionProvider for PerlProvider {
    fn language(&self) -> Language {
        Language::Perl
    }

    async fn list(&self, session: &Session, all: bool) -> Result<Vec<String>> {
        let text = session.fetcher.get_text(&self.releases_url).await?;
        let (os, arch) = session.platform.resolve(&OS_ARCH);
        Ok(limit(parse_releases(&text, os, arch)?, all))
    }

    async fn latest(&self, session: &Session) -> Result<String> {
        self.list(session, true)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TinyenvError::NoLatest(Language::Perl.to_string()).into())
    }

    fn validate(&self, version: &str) -> Result<()> {
        require_prefix(version, PREFIX)
    }

    async fn release(&self, session: &Session, version: &str) -> Result<Release> {
        let (os, arch) = session.platform.resolve(&OS_ARCH);
        let tag = version.strip_prefix(PREFIX).unwrap_or(version);
        let url = format!("{}/{tag}/perl-{os}-{arch}.tar.xz", self.download_url);
        Ok(Release::new(version, url, ArchiveFormat::TarXz))
    }
}
