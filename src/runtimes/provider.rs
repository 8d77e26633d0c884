//! Version provider trait shared by every ecosystem

use anyhow::Result;

use crate::core::archive::{ArchiveFormat, ArchiveLayout};
use crate::core::http::{Fetcher, RequestModifier};
use crate::core::platform::Platform;
use crate::core::{Language, TinyenvError};

/// Sentinel asking a provider for its newest installable version
pub const LATEST: &str = "latest";

/// Per-invocation state handed to every provider call
#[derive(Debug, Clone)]
pub struct Session {
    pub fetcher: Fetcher,
    pub platform: Platform,
}

impl Session {
    #[must_use]
    pub const fn new(fetcher: Fetcher, platform: Platform) -> Self {
        Self { fetcher, platform }
    }
}

/// A concrete downloadable build
#[derive(Debug, Clone)]
pub struct Release {
    pub version: String,
    pub url: String,
    pub format: ArchiveFormat,
    pub modifier: Option<RequestModifier>,
}

impl Release {
    pub fn new(version: impl Into<String>, url: impl Into<String>, format: ArchiveFormat) -> Self {
        Self {
            version: version.into(),
            url: url.into(),
            format,
            modifier: None,
        }
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: RequestModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }
}

/// Trait for version providers (Rust 2024 native async traits)
pub trait VersionProvider: Send + Sync {
    fn language(&self) -> Language;

    /// Newest-first identifiers; `all = false` returns the interesting subset
    fn list(&self, session: &Session, all: bool) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Concrete identifier that `latest` stands for
    fn latest(&self, session: &Session) -> impl Future<Output = Result<String>> + Send {
        async move {
            self.list(session, false)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| TinyenvError::NoLatest(self.language().to_string()).into())
        }
    }

    /// Release for `latest`.
    ///
    /// Providers whose listing already carries the download URL override this
    /// so one metadata fetch yields both the identifier and its asset.
    fn latest_release(&self, session: &Session) -> impl Future<Output = Result<Release>> + Send {
        async move {
            let version = self.latest(session).await?;
            self.release(session, &version).await
        }
    }

    /// Reject identifiers this ecosystem could never have produced
    fn validate(&self, _version: &str) -> Result<()> {
        Ok(())
    }

    /// Download location for a concrete identifier
    fn release(&self, session: &Session, version: &str) -> impl Future<Output = Result<Release>> + Send;

    fn layout(&self) -> ArchiveLayout {
        ArchiveLayout::STRIP_ONE
    }

    /// Directories inside an installed version that hold executables
    fn bin_dirs(&self) -> &'static [&'static str] {
        &["bin"]
    }
}

pub(crate) fn require_prefix(version: &str, prefix: &str) -> Result<()> {
    if version.starts_with(prefix) {
        Ok(())
    } else {
        Err(TinyenvError::InvalidVersion(version.to_string()).into())
    }
}
