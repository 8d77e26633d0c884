//! Cross-language "latest" report
//!
//! One lookup per language runs concurrently; rows come back in language
//! order no matter which lookup finishes first.

use std::path::Path;

use anyhow::Result;
use comfy_table::Color;
use futures::future::join_all;

use super::tables::{add_colored_row, table_with_columns};
use crate::config::Settings;
use crate::core::Language;
use crate::runtimes::{LanguageManager, Session, VersionProvider};

/// Where a language stands against its newest upstream release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    UpToDate,
    UpdateAvailable,
    NotInstalled,
    /// The upstream lookup failed; the message is shown in place
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct LatestRow {
    pub language: Language,
    pub latest: Option<String>,
    pub installed: Option<String>,
    pub active: Option<String>,
    pub status: Status,
}

fn status_for(latest: &str, installed: &[String]) -> Status {
    if installed.is_empty() {
        Status::NotInstalled
    } else if installed.iter().any(|v| v == latest) {
        Status::UpToDate
    } else {
        Status::UpdateAvailable
    }
}

async fn row<P: VersionProvider>(manager: &LanguageManager<P>, session: &Session) -> LatestRow {
    let installed = manager.versions().unwrap_or_default();
    let active = manager.current_version().ok().flatten();
    let (latest, status) = match manager.provider().latest(session).await {
        Ok(latest) => {
            let status = status_for(&latest, &installed);
            (Some(latest), status)
        }
        Err(err) => {
            tracing::warn!(language = %manager.language(), "latest lookup failed: {err:#}");
            (None, Status::Failed(format!("{err:#}")))
        }
    };
    LatestRow {
        language: manager.language(),
        latest,
        installed: installed.into_iter().next(),
        active,
        status,
    }
}

/// Look up every language concurrently
pub async fn collect<P: VersionProvider>(
    managers: &[LanguageManager<P>],
    session: &Session,
) -> Vec<LatestRow> {
    join_all(managers.iter().map(|m| row(m, session))).await
}

/// Print the report for every supported language
pub async fn report(root: &Path, settings: &Settings, session: &Session) -> Result<()> {
    let managers: Vec<LanguageManager> = Language::ALL
        .iter()
        .map(|&language| LanguageManager::new(root, language, settings))
        .collect();
    let rows = collect(&managers, session).await;

    let mut table = table_with_columns(&["Language", "Latest", "Installed", "Active", "Status"]);
    for row in &rows {
        let (status, color) = match &row.status {
            Status::UpToDate => ("up to date".to_string(), Color::Green),
            Status::UpdateAvailable => ("update available".to_string(), Color::Yellow),
            Status::NotInstalled => ("not installed".to_string(), Color::DarkGrey),
            Status::Failed(message) => (message.clone(), Color::Red),
        };
        add_colored_row(
            &mut table,
            &[
                (row.language.name(), Some(Color::Cyan)),
                (row.latest.as_deref().unwrap_or("-"), None),
                (row.installed.as_deref().unwrap_or("-"), None),
                (row.active.as_deref().unwrap_or("-"), None),
                (status.as_str(), Some(color)),
            ],
        );
    }
    println!("{table}");
    Ok(())
}
