//! Error types for tinyenv with helpful suggestions

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TinyenvError {
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    /// The resolved version is carried so callers can still activate it.
    #[error("already exists {}", path.display())]
    AlreadyExists { version: String, path: PathBuf },

    #[error("no version set for {0}")]
    NoVersion(String),

    #[error("no cache file for {0}")]
    NoCacheFile(String),

    #[error("could not resolve latest {0} version")]
    NoLatest(String),

    #[error("no {language} asset for {platform}")]
    NoAsset { language: String, platform: String },

    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("{status} {url}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("missing 'tar' command")]
    MissingTar,

    #[error("extracting {} failed: {status}", archive.display())]
    Extract {
        archive: PathBuf,
        status: std::process::ExitStatus,
    },

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("plugin {plugin} failed: {status}")]
    Plugin {
        plugin: String,
        status: std::process::ExitStatus,
    },

    #[error("invalid config {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },
}

impl TinyenvError {
    /// Get a helpful suggestion for how to fix this error
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnknownLanguage(_) => {
                Some("Supported languages: go, java, node, perl, python, raku, ruby, solr")
            }
            Self::InvalidVersion(_) => {
                Some("Try: tinyenv <language> install -l to see available versions")
            }
            Self::AlreadyExists { .. } => Some(
                "Remove the directory by hand, or run: tinyenv <language> reset <version>",
            ),
            Self::NoVersion(_) => Some("Try: tinyenv <language> global <version>"),
            Self::NoCacheFile(_) => Some("The archive is gone; install the version again"),
            Self::MissingTar => Some("Install GNU tar (gtar) or bsdtar and retry"),
            Self::Http { .. } => Some(
                "Check your internet connection and try again.\nIf behind a proxy, set HTTP_PROXY/HTTPS_PROXY",
            ),
            Self::InvalidConfig { .. } => Some("Check config.toml under TINYENV_ROOT for syntax errors"),
            Self::NoLatest(_)
            | Self::NoAsset { .. }
            | Self::UnsupportedPlatform { .. }
            | Self::Extract { .. }
            | Self::InvalidCommand(_)
            | Self::Plugin { .. } => None,
        }
    }

    /// True for an HTTP 404 response
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status == reqwest::StatusCode::NOT_FOUND)
    }
}

/// Format an error chain with its suggestion for display
pub fn format_error_with_suggestion(err: &anyhow::Error) -> String {
    let mut msg = format!("tinyenv: {err:#}");
    if let Some(suggestion) = err
        .downcast_ref::<TinyenvError>()
        .and_then(TinyenvError::suggestion)
    {
        msg.push('\n');
        msg.push_str(suggestion);
    }
    msg
}
