//! Workspace-wide install orchestration
//!
//! A monorepo may carry many managed directories. The orchestrator installs
//! each one on its own: a failing directory is recorded and the walk moves
//! on, so one broken package set never blocks the rest of the tree.

use std::path::Path;

use crate::config::resolver::{self, ConfigEntry};
use crate::config::PackmindConfig;
use crate::domain::FileOperationResult;
use crate::error::Result;
use crate::gateway::RemoteGateway;
use crate::git;
use crate::sync::{notify, SyncEngine};

/// Outcome of installing one managed directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryInstall {
    /// Display path of the configuration file, `./packmind.json` style
    pub display_path: String,
    pub packages: Vec<String>,
    pub result: FileOperationResult,
    pub notification_sent: bool,
    /// Empty package set, nothing to do
    pub skipped: bool,
    pub error_message: Option<String>,
}

impl DirectoryInstall {
    pub fn success(&self) -> bool {
        self.error_message.is_none()
    }
}

/// Aggregated outcome of a recursive install
#[derive(Debug, Clone, Default)]
pub struct RecursiveInstallReport {
    pub directories: Vec<DirectoryInstall>,
    pub directories_processed: usize,
    pub total_files_created: usize,
    pub total_files_updated: usize,
    pub total_files_deleted: usize,
    pub total_notifications: usize,
}

impl RecursiveInstallReport {
    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.directories
            .iter()
            .filter_map(|install| {
                install
                    .error_message
                    .as_deref()
                    .map(|message| (install.display_path.as_str(), message))
            })
            .collect()
    }
}

/// Display path of a configuration file relative to the search root
pub fn display_path(target_path: &str) -> String {
    let prefix = if target_path == "/" { "" } else { target_path };
    format!(".{prefix}/packmind.json")
}

/// Install the packages one directory already declares
///
/// The previous package set equals the desired one: this is a refresh, the
/// server computes deletions for artifacts that left the packages. Errors
/// are captured in the outcome, never propagated.
pub fn install_for_directory<G: RemoteGateway>(
    gateway: &G,
    directory: &Path,
    config: &PackmindConfig,
    display: String,
) -> DirectoryInstall {
    let packages = config.package_slugs();
    if packages.is_empty() {
        return DirectoryInstall {
            display_path: display,
            skipped: true,
            ..Default::default()
        };
    }

    let engine = SyncEngine::new(gateway);
    let result = match engine.sync(directory, &packages, &packages, config.agent_ids()) {
        Ok(result) => result,
        Err(err) => {
            return DirectoryInstall {
                display_path: display,
                packages,
                error_message: Some(err.to_string()),
                ..Default::default()
            };
        }
    };

    if !result.errors.is_empty() {
        let message = result.errors.join(", ");
        return DirectoryInstall {
            display_path: display,
            packages,
            result,
            notification_sent: false,
            skipped: false,
            error_message: Some(message),
        };
    }

    let notification_sent =
        notify::notify_distribution(gateway, directory, &packages, &result).is_ok();

    DirectoryInstall {
        display_path: display,
        packages,
        result,
        notification_sent,
        skipped: false,
        error_message: None,
    }
}

/// Discover every managed directory reachable from `start` and install each
///
/// The search root is the git repository root when there is one, `start`
/// otherwise. Entries process in target-path order, parents first.
pub fn recursive_install<G: RemoteGateway>(
    gateway: &G,
    start: &Path,
) -> Result<(Vec<ConfigEntry>, RecursiveInstallReport)> {
    let base = git::find_repository_root(start).unwrap_or_else(|| start.to_path_buf());
    let tree = resolver::find_all_configs_in_tree(start, &base)?;

    let mut report = RecursiveInstallReport::default();
    for entry in &tree.entries {
        let install = install_for_directory(
            gateway,
            &entry.absolute_target_path,
            &entry.config,
            display_path(&entry.target_path),
        );

        report.directories_processed += 1;
        report.total_files_created += install.result.files_created;
        report.total_files_updated += install.result.files_updated;
        report.total_files_deleted += install.result.total_deleted();
        if install.notification_sent {
            report.total_notifications += 1;
        }
        report.directories.push(install);
    }

    Ok((tree.entries, report))
}
