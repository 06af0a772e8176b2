//! Candidate-file discovery: directory walks and glob expansion.
//!
//! Directories are visited in sorted order so repeated runs over the same
//! tree document classes in the same order.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Recursively collect `.php` files under `dir`. A directory is skipped
/// when its name ends with one of the ignore suffixes (applied at every
/// level); symlinks are never followed.
pub fn php_files(dir: &Path, ignore_dirs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, ignore_dirs, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, ignore_dirs: &[String], files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            continue;
        }
        let path = entry.path();
        if file_type.is_dir() {
            let name = entry.file_name();
            if !should_ignore(&name.to_string_lossy(), ignore_dirs) {
                walk(&path, ignore_dirs, files)?;
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some("php") {
            files.push(path);
        }
    }
    Ok(())
}

fn should_ignore(dir_name: &str, ignore_dirs: &[String]) -> bool {
    ignore_dirs.iter().any(|ignored| {
        let ignored = ignored.trim();
        !ignored.is_empty() && dir_name.ends_with(ignored)
    })
}

/// Expand a glob pattern into existing `.php` files, sorted.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob::glob(pattern)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("php"))
        .collect();
    files.sort();
    files.dedup();
    Ok(files)
}

/// Group `(namespace, class name)` pairs into per-namespace lists, sorted
/// lexicographically by namespace; order within a namespace is preserved.
pub fn group_by_namespace<I>(entries: I) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (namespace, name) in entries {
        groups.entry(namespace).or_default().push(name);
    }
    groups.into_values().collect()
}
