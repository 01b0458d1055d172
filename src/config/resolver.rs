//! Configuration discovery across a repository tree
//!
//! Collects every directory carrying a `packmind.json`, both above the
//! starting directory (up to the search root) and anywhere below the
//! search root, so recursive operations see one deduplicated, ordered
//! set of managed directories.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use normpath::PathExt;
use walkdir::WalkDir;

use crate::config::{self, PackmindConfig};
use crate::error::Result;

/// Directory names never descended into during the downward scan
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "coverage",
    ".nx",
    "target",
];

/// One managed directory found by the tree scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Slash-delimited path relative to the search root, `/` for the root
    /// itself, `/`-prefixed otherwise
    pub target_path: String,
    /// Absolute, normalized directory path
    pub absolute_target_path: PathBuf,
    pub config: PackmindConfig,
}

/// All managed directories under (and above) one search root
#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    /// Entries ordered by `target_path`, parents before children
    pub entries: Vec<ConfigEntry>,
}

impl ConfigTree {
    pub fn has_configs(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// Find every configuration reachable from `start`
///
/// Walks upward from `start` to `stop_at` (exclusive of anything above it),
/// then downward from `stop_at` through the whole subtree, skipping
/// [`EXCLUDED_DIRS`]. A directory found by both passes appears once.
/// Malformed configuration files are skipped with a warning.
pub fn find_all_configs_in_tree(start: &Path, stop_at: &Path) -> Result<ConfigTree> {
    let base_path = normalize(stop_at);
    let start = normalize(start);

    let mut found: BTreeMap<String, ConfigEntry> = BTreeMap::new();

    // Upward pass: start and its ancestors, stopping at the search root
    let mut current = start.as_path();
    loop {
        collect_entry(current, &base_path, &mut found);
        if current == base_path {
            break;
        }
        match current.parent() {
            Some(parent) if parent.starts_with(&base_path) => current = parent,
            _ => break,
        }
    }

    // Downward pass over the whole subtree
    let walker = WalkDir::new(&base_path)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
        });

    for entry in walker.filter_map(std::result::Result::ok) {
        if entry.file_type().is_dir() {
            collect_entry(entry.path(), &base_path, &mut found);
        }
    }

    Ok(ConfigTree {
        entries: found.into_values().collect(),
    })
}

fn collect_entry(directory: &Path, base_path: &Path, found: &mut BTreeMap<String, ConfigEntry>) {
    let directory = normalize(directory);
    let target_path = relative_target_path(&directory, base_path);
    if found.contains_key(&target_path) {
        return;
    }
    if !config::exists(&directory) {
        return;
    }
    if let Some(config) = config::read_lenient(&directory) {
        found.insert(
            target_path.clone(),
            ConfigEntry {
                target_path,
                absolute_target_path: directory,
                config,
            },
        );
    }
}

/// Relative, slash-delimited path of `directory` under `base_path`
fn relative_target_path(directory: &Path, base_path: &Path) -> String {
    match directory.strip_prefix(base_path) {
        Ok(relative) if relative.as_os_str().is_empty() => "/".to_string(),
        Ok(relative) => {
            let mut path = String::from("/");
            path.push_str(&to_slashes(relative));
            path
        }
        Err(_) => to_slashes(directory),
    }
}

fn to_slashes(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize(path: &Path) -> PathBuf {
    path.normalize()
        .map(normpath::BasePathBuf::into_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(config::CONFIG_FILENAME), body).unwrap();
    }

    #[test]
    fn test_finds_root_and_nested_configs_sorted() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), r#"{"packages": {"root-pkg": "*"}}"#);
        write_config(
            &temp.path().join("services/api"),
            r#"{"packages": {"api-pkg": "*"}}"#,
        );
        write_config(
            &temp.path().join("apps/web"),
            r#"{"packages": {"web-pkg": "*"}}"#,
        );

        let tree = find_all_configs_in_tree(temp.path(), temp.path()).unwrap();
        let paths: Vec<&str> = tree
            .entries
            .iter()
            .map(|entry| entry.target_path.as_str())
            .collect();
        assert_eq!(paths, vec!["/", "/apps/web", "/services/api"]);
    }

    #[test]
    fn test_upward_and_downward_passes_deduplicate() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("packages/lib");
        write_config(temp.path(), r#"{"packages": {}}"#);
        write_config(&nested, r#"{"packages": {}}"#);

        // Starting below the root reaches both via the upward pass, then the
        // downward pass visits them again
        let tree = find_all_configs_in_tree(&nested, temp.path()).unwrap();
        assert_eq!(tree.entries.len(), 2);
    }

    #[test]
    fn test_excluded_directories_are_not_scanned() {
        let temp = TempDir::new().unwrap();
        write_config(
            &temp.path().join("node_modules/dep"),
            r#"{"packages": {}}"#,
        );
        write_config(&temp.path().join("target/debug"), r#"{"packages": {}}"#);
        write_config(&temp.path().join("src"), r#"{"packages": {}}"#);

        let tree = find_all_configs_in_tree(temp.path(), temp.path()).unwrap();
        let paths: Vec<&str> = tree
            .entries
            .iter()
            .map(|entry| entry.target_path.as_str())
            .collect();
        assert_eq!(paths, vec!["/src"]);
    }

    #[test]
    fn test_malformed_config_is_skipped() {
        let temp = TempDir::new().unwrap();
        write_config(&temp.path().join("good"), r#"{"packages": {}}"#);
        write_config(&temp.path().join("bad"), "{not json");

        let tree = find_all_configs_in_tree(temp.path(), temp.path()).unwrap();
        assert_eq!(tree.entries.len(), 1);
        assert_eq!(tree.entries[0].target_path, "/good");
    }

    #[test]
    fn test_empty_tree_has_no_configs() {
        let temp = TempDir::new().unwrap();
        let tree = find_all_configs_in_tree(temp.path(), temp.path()).unwrap();
        assert!(!tree.has_configs());
    }
}
