//! Status command implementation
//!
//! Offline overview of every packmind.json in the workspace with the
//! packages each one declares.

use crate::commands::helpers;
use crate::config::resolver::{self, ConfigEntry};
use crate::error::Result;
use crate::git;
use crate::orchestrator;
use crate::ui;

pub fn run() -> Result<i32> {
    let cwd = helpers::current_dir()?;
    let base = git::find_repository_root(&cwd).unwrap_or_else(|| cwd.clone());

    let tree = match resolver::find_all_configs_in_tree(&cwd, &base) {
        Ok(tree) => tree,
        Err(err) => {
            ui::error("Failed to get workspace overview:");
            ui::error(&err.to_string());
            return Ok(1);
        }
    };

    if !tree.has_configs() {
        println!("No packmind.json available in this workspace.");
        return Ok(0);
    }

    for line in overview_lines(&tree.entries) {
        println!("{line}");
    }

    Ok(0)
}

/// Table of config paths and their package sets, plus a unique-count summary
fn overview_lines(entries: &[ConfigEntry]) -> Vec<String> {
    let display_paths: Vec<String> = entries
        .iter()
        .map(|entry| orchestrator::display_path(&entry.target_path))
        .collect();
    let width = display_paths
        .iter()
        .map(String::len)
        .chain(std::iter::once("packmind.json".len()))
        .max()
        .unwrap_or(0);

    let header = format!("{:width$}  Packages", "packmind.json");
    let separator = "-".repeat(header.len() + 20);

    let mut lines = vec![
        "Workspace packages status\n".to_string(),
        header,
        separator,
    ];

    let mut unique: Vec<&str> = Vec::new();
    for (entry, display_path) in entries.iter().zip(&display_paths) {
        let mut packages = entry.config.package_slugs();
        packages.sort();
        for slug in entry.config.packages.keys() {
            if !unique.contains(&slug.as_str()) {
                unique.push(slug.as_str());
            }
        }
        let cell = if packages.is_empty() {
            "<no packages>".to_string()
        } else {
            packages.join(", ")
        };
        lines.push(format!("{display_path:width$}  {cell}"));
    }

    let word = helpers::pluralize(unique.len(), "package", "packages");
    lines.push(format!(
        "\n{} unique {word} currently installed.",
        unique.len()
    ));
    lines
}
