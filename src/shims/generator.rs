//! Shim generation for the shared bin directory
//!
//! Every shim starts with a two-line header naming the language that owns it.
//! A rehash deletes exactly the files carrying its own header, then writes one
//! shim per executable of the active version.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::RehashFilter;
use crate::core::{Language, TinyenvError};

/// What one rehash did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RehashReport {
    /// Stale shims deleted
    pub removed: usize,
    /// Shim names written, sorted
    pub written: Vec<String>,
}

/// Ownership header for shims written on behalf of `language`
#[must_use]
pub fn shim_header(language: Language) -> String {
    format!("#!/bin/sh\n# {}\n", language.name())
}

/// Full shim text delegating to `target`
#[must_use]
pub fn shim_content(language: Language, target: &Path) -> String {
    format!("{}exec \"{}\" \"$@\"\n", shim_header(language), target.display())
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.is_file() && meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(meta: &fs::Metadata) -> bool {
    meta.is_file()
}

/// Executables under `version_dir/<bin_dir>` keyed by file name.
///
/// Symlinks count when their target is an executable file. A bin dir the
/// version does not ship is skipped; the first bin dir wins a name clash.
/// A missing `version_dir` is an error, so a stale pointer never wipes shims.
pub fn find_executables(
    version_dir: &Path,
    bin_dirs: &[&str],
    filter: &RehashFilter,
) -> Result<BTreeMap<String, PathBuf>> {
    if !version_dir.is_dir() {
        let version = version_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(TinyenvError::InvalidVersion(version).into());
    }

    let mut found = BTreeMap::new();
    for bin_dir in bin_dirs {
        let dir = version_dir.join(bin_dir);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "no such bin dir");
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", dir.display())),
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let Ok(meta) = fs::metadata(&path) else {
                tracing::warn!(path = %path.display(), "skipping dangling link");
                continue;
            };
            if !is_executable(&meta) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !filter.allows(&name) {
                continue;
            }
            found.entry(name).or_insert(path);
        }
    }
    Ok(found)
}

fn starts_with_header(path: &Path, header: &[u8]) -> Result<bool> {
    let file = fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut prefix = Vec::with_capacity(header.len());
    file.take(header.len() as u64)
        .read_to_end(&mut prefix)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(prefix == header)
}

/// Delete every file in `bin_dir` that carries `language`'s header
pub fn remove_owned(bin_dir: &Path, language: Language) -> Result<usize> {
    let header = shim_header(language);
    let mut removed = 0;
    for entry in fs::read_dir(bin_dir).with_context(|| format!("Failed to read {}", bin_dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if starts_with_header(&path, header.as_bytes())? {
            tracing::debug!(shim = %path.display(), "removing stale shim");
            fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn write_shim(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

/// Replace `language`'s shims in `bin_dir` with ones for `version_dir`
pub fn rehash(
    language: Language,
    version_dir: &Path,
    bin_dirs: &[&str],
    bin_dir: &Path,
    filter: &RehashFilter,
) -> Result<RehashReport> {
    let executables = find_executables(version_dir, bin_dirs, filter)?;
    fs::create_dir_all(bin_dir).with_context(|| format!("Failed to create {}", bin_dir.display()))?;

    let removed = remove_owned(bin_dir, language)?;
    let mut written = Vec::with_capacity(executables.len());
    for (name, target) in executables {
        write_shim(&bin_dir.join(&name), &shim_content(language, &target))?;
        written.push(name);
    }

    tracing::debug!(%language, removed, written = written.len(), "rehashed");
    Ok(RehashReport { removed, written })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn exe(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn plain(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "data").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o644)).unwrap();
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_shim_content() {
        let content = shim_content(Language::Go, Path::new("/r/go/versions/1.22.0/bin/go"));
        assert_eq!(
            content,
            "#!/bin/sh\n# go\nexec \"/r/go/versions/1.22.0/bin/go\" \"$@\"\n"
        );
    }

    #[test]
    fn test_find_executables_filters_mode_and_config() {
        let tmp = TempDir::new().unwrap();
        let version = tmp.path().join("v1");
        exe(&version.join("bin/node"));
        exe(&version.join("bin/npm"));
        plain(&version.join("bin/README"));
        fs::create_dir_all(version.join("bin/subdir")).unwrap();
        exe(&version.join("share/perl6/site/bin/zef"));

        let all = find_executables(&version, &["bin", "share/perl6/site/bin", "missing"], &RehashFilter::default()).unwrap();
        assert_eq!(all.keys().collect::<Vec<_>>(), ["node", "npm", "zef"]);

        let filter = RehashFilter::new(&["^n"], &["^npm$"]).unwrap();
        let filtered = find_executables(&version, &["bin"], &filter).unwrap();
        assert_eq!(filtered.keys().collect::<Vec<_>>(), ["node"]);
    }

    #[test]
    fn test_find_executables_follows_symlinks() {
        let tmp = TempDir::new().unwrap();
        let version = tmp.path().join("v1");
        exe(&version.join("lib/npm-cli.js"));
        fs::create_dir_all(version.join("bin")).unwrap();
        std::os::unix::fs::symlink("../lib/npm-cli.js", version.join("bin/npm")).unwrap();
        std::os::unix::fs::symlink("../lib/gone", version.join("bin/dangling")).unwrap();

        let found = find_executables(&version, &["bin"], &RehashFilter::default()).unwrap();
        assert_eq!(found.keys().collect::<Vec<_>>(), ["npm"]);
    }

    #[test]
    fn test_remove_owned_leaves_foreign_files() {
        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("go"), shim_content(Language::Go, Path::new("/x/go"))).unwrap();
        fs::write(bin.join("node"), shim_content(Language::Node, Path::new("/x/node"))).unwrap();
        fs::write(bin.join("mine"), "#!/bin/sh\necho hi\n").unwrap();
        fs::write(bin.join("g"), "#!").unwrap();

        assert_eq!(remove_owned(&bin, Language::Go).unwrap(), 1);
        assert_eq!(names(&bin), ["g", "mine", "node"]);
    }

    #[test]
    fn test_rehash_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let version = tmp.path().join("go/versions/1.22.0");
        exe(&version.join("bin/go"));
        exe(&version.join("bin/gofmt"));
        let bin = tmp.path().join("bin");

        let first = rehash(Language::Go, &version, &["bin"], &bin, &RehashFilter::default()).unwrap();
        let snapshot = fs::read_to_string(bin.join("go")).unwrap();
        let second = rehash(Language::Go, &version, &["bin"], &bin, &RehashFilter::default()).unwrap();

        assert_eq!(first.written, ["go", "gofmt"]);
        assert_eq!(second.removed, 2);
        assert_eq!(fs::read_to_string(bin.join("go")).unwrap(), snapshot);
        let mode = fs::metadata(bin.join("go")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_rehash_missing_version_keeps_shims() {
        let tmp = TempDir::new().unwrap();
        let version = tmp.path().join("go/versions/1.22.0");
        exe(&version.join("bin/go"));
        let bin = tmp.path().join("bin");
        rehash(Language::Go, &version, &["bin"], &bin, &RehashFilter::default()).unwrap();

        fs::remove_dir_all(&version).unwrap();
        let err = rehash(Language::Go, &version, &["bin"], &bin, &RehashFilter::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TinyenvError>(),
            Some(TinyenvError::InvalidVersion(v)) if v == "1.22.0"
        ));
        assert_eq!(names(&bin), ["go"]);
    }

    #[test]
    fn test_rehash_replaces_previous_generation() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("node/versions/a");
        let b = tmp.path().join("node/versions/b");
        exe(&a.join("bin/node"));
        exe(&a.join("bin/corepack"));
        exe(&b.join("bin/node"));
        exe(&b.join("bin/npx"));
        let bin = tmp.path().join("bin");

        rehash(Language::Node, &a, &["bin"], &bin, &RehashFilter::default()).unwrap();
        rehash(Language::Node, &b, &["bin"], &bin, &RehashFilter::default()).unwrap();

        assert_eq!(names(&bin), ["node", "npx"]);
        let node = fs::read_to_string(bin.join("node")).unwrap();
        assert!(node.contains(&b.join("bin/node").display().to_string()));
    }
}
