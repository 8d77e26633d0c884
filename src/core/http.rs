//! HTTP fetching: plain GETs and conditional mirroring into the cache
//!
//! Two reqwest clients are kept, one tuned for small metadata requests and one
//! with an extended timeout for archive downloads.

use std::path::Path;

use anyhow::{Context, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{IF_MODIFIED_SINCE, LAST_MODIFIED};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use super::error::TinyenvError;
use crate::config::HttpSettings;

/// Adjusts a request before it is sent (extra headers, auth)
pub type RequestModifier = fn(RequestBuilder) -> RequestBuilder;

/// Outcome of a [`Fetcher::mirror`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorStatus {
    Downloaded,
    NotModified,
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    download_client: Client,
}

fn build_client(settings: &HttpSettings, timeout: std::time::Duration) -> Result<Client> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(settings.connect_timeout())
        .tcp_nodelay(true)
        .build()
        .context("Failed to build HTTP client - check TLS configuration")
}

fn download_progress_style() -> Option<ProgressStyle> {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
        .ok()
        .map(|style| style.progress_chars("█▓▒░"))
}

fn ensure_success(status: StatusCode, url: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(TinyenvError::Http {
        status,
        url: url.to_string(),
    }
    .into())
}

impl Fetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(settings, settings.timeout())?,
            download_client: build_client(settings, settings.download_timeout())?,
        })
    }

    /// GET `url` and return the body; any non-2xx status is an error
    pub async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to connect to {url}"))?;
        ensure_success(response.status(), url)?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response from {url}"))?;
        Ok(body.to_vec())
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        let body = self.get(url).await?;
        String::from_utf8(body).with_context(|| format!("Response from {url} is not UTF-8"))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get(url).await?;
        serde_json::from_slice(&body).with_context(|| format!("Failed to parse JSON from {url}"))
    }

    /// HEAD `url`; succeeds only on a 2xx response
    pub async fn head(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .with_context(|| format!("Failed to connect to {url}"))?;
        ensure_success(response.status(), url)
    }

    /// Download `url` into `dest` unless the upstream copy is unchanged.
    ///
    /// An existing `dest` contributes its mtime as `If-Modified-Since`. The body
    /// is streamed into a temp file beside `dest`, stamped with `Last-Modified`
    /// and renamed over `dest`, so a failed download never touches it.
    pub async fn mirror(
        &self,
        url: &str,
        dest: &Path,
        modifier: Option<RequestModifier>,
    ) -> Result<MirrorStatus> {
        let mut request = self.download_client.get(url);
        if let Ok(modified) = tokio::fs::metadata(dest).await.and_then(|m| m.modified()) {
            let since = httpdate::fmt_http_date(modified);
            tracing::debug!(%url, %since, "conditional download");
            request = request.header(IF_MODIFIED_SINCE, since);
        }
        if let Some(modify) = modifier {
            request = modify(request);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to connect to {url}"))?;
        if response.status() == StatusCode::NOT_MODIFIED {
            tracing::debug!(%url, "not modified, keeping cached copy");
            return Ok(MirrorStatus::NotModified);
        }
        ensure_success(response.status(), url)?;

        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| httpdate::parse_http_date(v).ok());

        let parent = dest
            .parent()
            .with_context(|| format!("{} has no parent directory", dest.display()))?;
        let (file, temp_path) = tempfile::Builder::new()
            .prefix(".download-")
            .tempfile_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let pb = ProgressBar::new(response.content_length().unwrap_or(0));
        if let Some(style) = download_progress_style() {
            pb.set_style(style);
        }

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("Error downloading {url}"))?;
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}. Check disk space.", temp_path.display()))?;
            pb.inc(chunk.len() as u64);
        }
        file.flush().await?;
        pb.finish_and_clear();

        let file = file.into_std().await;
        if let Some(modified) = last_modified {
            file.set_modified(modified)
                .with_context(|| format!("Failed to set mtime on {}", temp_path.display()))?;
        }
        drop(file);

        temp_path
            .persist(dest)
            .with_context(|| format!("Failed to move download into {}", dest.display()))?;
        Ok(MirrorStatus::Downloaded)
    }
}
