//! Best-effort distribution notification
//!
//! After a sync that touched the tree, the server is told which packages now
//! live at this repository location. The notification must never fail an
//! install, so every reason it cannot or did not go out is a
//! [`NotificationSkipped`] the caller may log and drop.

use std::path::Path;

use crate::domain::FileOperationResult;
use crate::gateway::{DeploymentReceipt, DistributionReport, RemoteGateway};
use crate::git;

/// Why no notification was recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationSkipped {
    /// The sync changed nothing, so there is nothing to record
    NoChanges,
    /// The directory is outside a git repository or lacks remote/branch
    NoGitContext,
    /// The request was attempted but the server did not accept it
    RequestFailed(String),
}

/// Notify the server that `packages` were distributed into `directory`
pub fn notify_distribution<G: RemoteGateway>(
    gateway: &G,
    directory: &Path,
    packages: &[String],
    result: &FileOperationResult,
) -> std::result::Result<DeploymentReceipt, NotificationSkipped> {
    if !result.has_changes() {
        return Err(NotificationSkipped::NoChanges);
    }

    let context = git::context_for(directory).map_err(|_| NotificationSkipped::NoGitContext)?;

    let report = DistributionReport {
        distributed_packages: packages,
        git_remote_url: &context.git_remote_url,
        git_branch: &context.git_branch,
        relative_path: &context.relative_path,
    };

    gateway
        .notify_distribution(&report)
        .map_err(|err| NotificationSkipped::RequestFailed(err.to_string()))
}
