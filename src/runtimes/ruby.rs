//! Ruby from Homebrew's portable-ruby bottles
//!
//! Homebrew only publishes the current stable portable Ruby, so the listing is
//! always a single identifier.

use std::collections::BTreeMap;

use anyhow::Result;
use regex::Regex;
use reqwest::RequestBuilder;
use serde::Deserialize;

use super::provider::{Release, Session, VersionProvider};
use crate::core::archive::{ArchiveFormat, ArchiveLayout};
use crate::core::platform::{Arch, Os, Platform};
use crate::core::{Language, TinyenvError};

pub const PORTABLE_RUBY_FORMULA: &str = "https://formulae.brew.sh/api/formula/portable-ruby.json";

const PREFIX: &str = "homebrew-portable-";

#[derive(Debug, Deserialize)]
struct Formula {
    versions: FormulaVersions,
    bottle: FormulaBottles,
}

#[derive(Debug, Deserialize)]
struct FormulaVersions {
    stable: String,
}

#[derive(Debug, Deserialize)]
struct FormulaBottles {
    stable: BottleSet,
}

#[derive(Debug, Deserialize)]
struct BottleSet {
    files: BTreeMap<String, BottleFile>,
}

#[derive(Debug, Deserialize)]
struct BottleFile {
    url: String,
}

/// The ghcr.io bottle host wants a bearer token, any token
fn bottle_auth(req: RequestBuilder) -> RequestBuilder {
    req.bearer_auth("QQ==")
}

/// Bottle key pattern for a platform
pub(crate) const fn bottle_pattern(platform: Platform) -> &'static str {
    match (platform.os, platform.arch) {
        (Os::Linux, Arch::Amd64) => r"^x86_64_linux$",
        (Os::Linux, Arch::Arm64) => r"^arm64_linux$",
        (Os::Darwin, Arch::Amd64) => r"^catalina$",
        (Os::Darwin, Arch::Arm64) => r"^arm64_",
    }
}

/// Identifier and bottle URL of the current portable Ruby for `platform`
pub fn select_bottle(body: &str, platform: Platform) -> Result<(String, String)> {
    let formula: Formula = serde_json::from_str(body)?;
    let pattern = Regex::new(bottle_pattern(platform))?;
    let url = formula
        .bottle
        .stable
        .files
        .into_iter()
        .find_map(|(key, file)| pattern.is_match(&key).then_some(file.url))
        .ok_or_else(|| TinyenvError::NoAsset {
            language: Language::Ruby.to_string(),
            platform: platform.to_string(),
        })?;
    Ok((format!("{PREFIX}{}", formula.versions.stable), url))
}

#[derive(Debug, Clone)]
pub struct RubyProvider {
    formula_url: String,
}

impl Default for RubyProvider {
    fn default() -> Self {
        Self::with_formula(PORTABLE_RUBY_FORMULA)
    }
}

impl RubyProvider {
    pub fn with_formula(formula_url: &str) -> Self {
        Self {
            formula_url: formula_url.to_string(),
        }
    }

    async fn current(&self, session: &Session) -> Result<(String, String)> {
        let body = session.fetcher.get_text(&self.formula_url).await?;
        select_bottle(&body, session.platform)
    }
}

impl VersionProvider for RubyProvider {
    fn language(&self) -> Language {
        Language::Ruby
    }

    async fn list(&self, session: &Session, _all: bool) -> Result<Vec<String>> {
        let (version, _) = self.current(session).await?;
        Ok(vec![version])
    }

    /// Only the bottle Homebrew currently publishes can be installed
    async fn release(&self, session: &Session, version: &str) -> Result<Release> {
        let (current, url) = self.current(session).await?;
        if current != version {
            return Err(TinyenvError::InvalidVersion(version.to_string()).into());
        }
        Ok(Release::new(version, url, ArchiveFormat::TarGz).with_modifier(bottle_auth))
    }

    /// One formula fetch names the version and its bottle
    async fn latest_release(&self, session: &Session) -> Result<Release> {
        let (version, url) = self.current(session).await?;
        Ok(Release::new(version, url, ArchiveFormat::TarGz).with_modifier(bottle_auth))
    }

    /// Bottles nest as `portable-ruby/<version>/...`
    fn layout(&self) -> ArchiveLayout {
        ArchiveLayout::STRIP_TWO
    }
}
