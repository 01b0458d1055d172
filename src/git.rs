//! Git repository context
//!
//! Sync and diff requests carry the repository remote, branch and the
//! directory's position inside the work tree so the server can scope
//! deployments to one location.

use std::path::{Path, PathBuf};

use git2::Repository;
use normpath::PathExt;
use serde::{Deserialize, Serialize};

use crate::error::{PackmindError, Result};

/// Where a directory sits inside a git repository
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GitContext {
    pub git_remote_url: String,
    pub git_branch: String,
    /// Slash-delimited path from the repository root, always `/`-prefixed
    /// and `/`-suffixed (`/` for the root itself)
    pub relative_path: String,
}

/// Find the root of the repository containing `start`, if any
pub fn find_repository_root(start: &Path) -> Option<PathBuf> {
    let repo = Repository::discover(start).ok()?;
    let workdir = repo.workdir()?;
    Some(normalize(workdir))
}

/// Resolve the full git context for `directory`
///
/// Fails when `directory` is outside any repository; a missing `origin`
/// remote or a detached head is a git operation error since the server
/// cannot scope a deployment without them.
pub fn context_for(directory: &Path) -> Result<GitContext> {
    let repo = Repository::discover(directory).map_err(|_| PackmindError::NotInGitRepository)?;
    let root = repo
        .workdir()
        .map(normalize)
        .ok_or(PackmindError::NotInGitRepository)?;

    let remote = repo
        .find_remote("origin")
        .map_err(|err| PackmindError::GitOperationFailed {
            message: format!("no 'origin' remote configured: {err}"),
        })?;
    let git_remote_url = remote
        .url()
        .ok_or_else(|| PackmindError::GitOperationFailed {
            message: "the 'origin' remote has no URL".to_string(),
        })?
        .to_string();

    let head = repo.head().map_err(|err| PackmindError::GitOperationFailed {
        message: format!("cannot resolve HEAD: {err}"),
    })?;
    let git_branch = head
        .shorthand()
        .ok_or_else(|| PackmindError::GitOperationFailed {
            message: "HEAD does not point to a branch".to_string(),
        })?
        .to_string();

    Ok(GitContext {
        git_remote_url,
        git_branch,
        relative_path: relative_path_from_root(&root, &normalize(directory)),
    })
}

/// Slash-wrapped path of `directory` relative to `root`
///
/// The server matches deployment targets on this exact form, so the root
/// is `/` and `sub/dir` becomes `/sub/dir/`.
pub fn relative_path_from_root(root: &Path, directory: &Path) -> String {
    match directory.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => "/".to_string(),
        Ok(relative) => {
            let joined = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            format!("/{joined}/")
        }
        Err(_) => "/".to_string(),
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.normalize()
        .map(normpath::BasePathBuf::into_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}
