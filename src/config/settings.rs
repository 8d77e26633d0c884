//! tinyenv settings and configuration

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;

use crate::core::{Language, TinyenvError};

/// tinyenv configuration settings, read from `config.toml` under the root
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP client tuning
    pub http: HttpSettings,

    /// Per-language shim filters, keyed by language name
    pub rehash: HashMap<Language, RehashFilter>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Timeout for metadata requests (seconds)
    pub timeout_secs: u64,
    /// Timeout for archive downloads (seconds)
    pub download_timeout_secs: u64,
    /// Connect timeout (seconds)
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            download_timeout_secs: 300,
            connect_timeout_secs: 10,
            user_agent: concat!("tinyenv/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpSettings {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RehashPatterns {
    includes: Vec<String>,
    excludes: Vec<String>,
}

/// Decides which executables of a language get a shim
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "RehashPatterns")]
pub struct RehashFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl TryFrom<RehashPatterns> for RehashFilter {
    type Error = regex::Error;

    fn try_from(patterns: RehashPatterns) -> Result<Self, Self::Error> {
        Self::new(&patterns.includes, &patterns.excludes)
    }
}

impl RehashFilter {
    pub fn new<S: AsRef<str>>(includes: &[S], excludes: &[S]) -> Result<Self, regex::Error> {
        let compile = |patterns: &[S]| {
            patterns
                .iter()
                .map(|p| Regex::new(p.as_ref()))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            includes: compile(includes)?,
            excludes: compile(excludes)?,
        })
    }

    /// True if `name` should be shimmed
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        if !self.includes.is_empty() && !self.includes.iter().any(|r| r.is_match(name)) {
            return false;
        }
        !self.excludes.iter().any(|r| r.is_match(name))
    }
}

impl Settings {
    /// Load settings from the config file, falling back to defaults when absent
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = Self::config_path(root);

        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content).map_err(|e| {
            TinyenvError::InvalidConfig {
                path: config_path,
                message: e.to_string(),
            }
            .into()
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get the config file path (`TINYENV_CONFIG` overrides)
    #[must_use]
    pub fn config_path(root: &Path) -> PathBuf {
        std::env::var_os("TINYENV_CONFIG")
            .map_or_else(|| root.join("config.toml"), PathBuf::from)
    }

    /// Shim filter for a language; permissive when unconfigured
    #[must_use]
    pub fn rehash_filter(&self, language: Language) -> RehashFilter {
        self.rehash.get(&language).cloned().unwrap_or_default()
    }
}
