//! Shared installation pipeline
//!
//! resolve -> validate -> existence check -> locate asset -> mirror into the
//! cache -> extract into `versions/<id>`. For `latest` the asset is located
//! together with the identifier.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::provider::{LATEST, Session, VersionProvider};
use crate::core::TinyenvError;
use crate::core::archive;
use crate::core::http::MirrorStatus;
use crate::core::paths::LanguagePaths;

/// Install `version` (or `latest`) and return the concrete identifier.
///
/// The target directory is checked before any download so an installed
/// version is never fetched again; that case is `TinyenvError::AlreadyExists`.
pub async fn install<P: VersionProvider>(
    provider: &P,
    session: &Session,
    paths: &LanguagePaths,
    version: &str,
) -> Result<String> {
    let (version, resolved) = if version == LATEST {
        let release = provider.latest_release(session).await?;
        tracing::debug!(language = %provider.language(), resolved = %release.version, "resolved latest");
        (release.version.clone(), Some(release))
    } else {
        (version.to_string(), None)
    };
    provider.validate(&version)?;

    let target = paths.version_dir(&version);
    if target.exists() {
        return Err(TinyenvError::AlreadyExists {
            version,
            path: target,
        }
        .into());
    }

    let release = match resolved {
        Some(release) => release,
        None => provider.release(session, &version).await?,
    };
    let cache_dir = paths.cache_dir();
    tokio::fs::create_dir_all(&cache_dir)
        .await
        .with_context(|| format!("Failed to create {}", cache_dir.display()))?;
    let cache_file = paths.cache_file(&version, release.format);

    println!("{} Downloading {}", "→".blue(), release.url);
    let status = session
        .fetcher
        .mirror(&release.url, &cache_file, release.modifier)
        .await?;
    if status == MirrorStatus::NotModified {
        tracing::debug!(file = %cache_file.display(), "reusing cached archive");
    }

    println!("{} Extracting {}", "→".blue(), cache_file.display());
    archive::extract(&cache_file, &target, provider.layout(), session.platform).await?;
    Ok(version)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use crate::core::Language;
    use crate::core::archive::ArchiveFormat;
    use crate::core::http::Fetcher;
    use crate::core::platform::{Arch, Os, Platform};
    use crate::runtimes::provider::Release;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Serves a fixed version list and counts release lookups
    struct StubProvider {
        base_url: String,
        releases: AtomicUsize,
    }

    impl StubProvider {
        fn new(base_url: String) -> Self {
            Self {
                base_url,
                releases: AtomicUsize::new(0),
            }
        }
    }

    impl VersionProvider for StubProvider {
        fn language(&self) -> Language {
            Language::Go
        }

        async fn list(&self, _session: &Session, _all: bool) -> Result<Vec<String>> {
            Ok(vec!["2.0.0".to_string(), "1.0.0".to_string()])
        }

        fn validate(&self, version: &str) -> Result<()> {
            if version.starts_with('v') {
                return Err(TinyenvError::InvalidVersion(version.to_string()).into());
            }
            Ok(())
        }

        async fn release(&self, _session: &Session, version: &str) -> Result<Release> {
            self.releases.fetch_add(1, Ordering::SeqCst);
            Ok(Release::new(
                version,
                format!("{}/tool-{version}.tar.gz", self.base_url),
                ArchiveFormat::TarGz,
            ))
        }
    }

    fn tarball(top: &str) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let body = b"#!/bin/sh\necho tool\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{top}/bin/tool"), &body[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn session() -> Session {
        Session::new(
            Fetcher::new(&HttpSettings::default()).unwrap(),
            Platform::new(Os::Linux, Arch::Amd64),
        )
    }

    #[tokio::test]
    async fn test_install_latest_downloads_and_extracts() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tool-2.0.0.tar.gz")
            .with_status(200)
            .with_body(tarball("tool-2.0.0"))
            .create_async()
            .await;

        let root = TempDir::new().unwrap();
        let paths = LanguagePaths::new(root.path(), Language::Go);
        let provider = StubProvider::new(server.url());

        let version = install(&provider, &session(), &paths, LATEST).await.unwrap();
        assert_eq!(version, "2.0.0");
        assert!(paths.version_dir("2.0.0").join("bin/tool").is_file());
        assert!(paths.cache_file("2.0.0", ArchiveFormat::TarGz).is_file());
    }

    #[tokio::test]
    async fn test_existing_target_is_rejected_before_download() {
        let root = TempDir::new().unwrap();
        let paths = LanguagePaths::new(root.path(), Language::Go);
        std::fs::create_dir_all(paths.version_dir("1.0.0").join("bin")).unwrap();
        std::fs::write(paths.version_dir("1.0.0").join("bin/keep"), "x").unwrap();
        let provider = StubProvider::new("http://127.0.0.1:9".to_string());

        let err = install(&provider, &session(), &paths, "1.0.0").await.unwrap_err();
        match err.downcast_ref::<TinyenvError>() {
            Some(TinyenvError::AlreadyExists { version, path }) => {
                assert_eq!(version, "1.0.0");
                assert_eq!(path, &paths.version_dir("1.0.0"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.releases.load(Ordering::SeqCst), 0);
        assert!(!paths.cache_dir().exists());
        assert!(paths.version_dir("1.0.0").join("bin/keep").is_file());
    }

    #[tokio::test]
    async fn test_invalid_version_creates_nothing() {
        let root = TempDir::new().unwrap();
        let paths = LanguagePaths::new(root.path(), Language::Go);
        let provider = StubProvider::new("http://127.0.0.1:9".to_string());

        let err = install(&provider, &session(), &paths, "v1").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TinyenvError>(),
            Some(TinyenvError::InvalidVersion(_))
        ));
        assert!(!paths.root().exists());
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_version_dir() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/tool-1.0.0.tar.gz")
            .with_status(404)
            .create_async()
            .await;

        let root = TempDir::new().unwrap();
        let paths = LanguagePaths::new(root.path(), Language::Go);
        let provider = StubProvider::new(server.url());

        assert!(install(&provider, &session(), &paths, "1.0.0").await.is_err());
        assert!(!paths.version_dir("1.0.0").exists());
        assert!(!paths.cache_file("1.0.0", ArchiveFormat::TarGz).exists());
    }
}
