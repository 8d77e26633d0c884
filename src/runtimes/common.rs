//! Common utilities for version providers
//!
//! Version ordering, de-duplication and list truncation shared by the
//! ecosystem modules.

use std::cmp::Ordering;
use std::collections::HashSet;

/// How many identifiers a "recent" listing shows
pub const RECENT_LIMIT: usize = 10;

/// Compare numeric components of two version strings (ascending)
pub fn version_cmp(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<u64> = a
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|p| p.parse().ok())
        .collect();
    let b_parts: Vec<u64> = b
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|p| p.parse().ok())
        .collect();

    for i in 0..a_parts.len().max(b_parts.len()) {
        let a_part = a_parts.get(i).unwrap_or(&0);
        let b_part = b_parts.get(i).unwrap_or(&0);
        if a_part != b_part {
            return a_part.cmp(b_part);
        }
    }

    Ordering::Equal
}

/// Parse as semver, tolerating a leading `v` and missing minor/patch
pub fn parse_semver(version: &str) -> Option<semver::Version> {
    let version = version.strip_prefix('v').unwrap_or(version);
    if let Ok(parsed) = semver::Version::parse(version) {
        return Some(parsed);
    }
    let split = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(split);
    let parts = core.split('.').count();
    if core.is_empty() || parts >= 3 {
        return None;
    }
    let padded = format!("{core}{}{suffix}", ".0".repeat(3 - parts));
    semver::Version::parse(&padded).ok()
}

/// Ascending order: semver when both parse, valid before invalid, else numeric
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_semver(a), parse_semver(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => version_cmp(a, b).then_with(|| a.cmp(b)),
    }
}

/// Sort newest first
pub fn sort_descending(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(b, a));
}

/// Drop repeats, keeping the first occurrence
pub fn dedupe(versions: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    versions
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Truncate to [`RECENT_LIMIT`] unless everything was requested
pub fn limit(mut versions: Vec<String>, all: bool) -> Vec<String> {
    if !all {
        versions.truncate(RECENT_LIMIT);
    }
    versions
}
