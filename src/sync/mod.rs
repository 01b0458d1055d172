//! Package sync engine
//!
//! Applies the remote rendering of a package set to one directory: skill
//! folders are wiped and re-created, files are created or updated in place,
//! and files the remote no longer wants are removed. File-level failures
//! accumulate in the result instead of aborting the batch, so a sync always
//! reports its full outcome.

pub mod merge;
pub mod notify;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use walkdir::WalkDir;

use crate::domain::FileOperationResult;
use crate::error::Result;
use crate::gateway::{PullRequest, PullResponse, RemoteGateway, RenderedFile};
use crate::git;

pub struct SyncEngine<'a, G: RemoteGateway> {
    gateway: &'a G,
}

impl<'a, G: RemoteGateway> SyncEngine<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        SyncEngine { gateway }
    }

    /// Synchronize `directory` to carry exactly `desired`
    ///
    /// `previous` is the package set the directory had before; the server
    /// uses it to compute deletions. Desired and previous being equal is the
    /// refresh case.
    pub fn sync(
        &self,
        directory: &Path,
        desired: &[String],
        previous: &[String],
        agents: Option<Vec<String>>,
    ) -> Result<FileOperationResult> {
        let request = PullRequest {
            package_slugs: desired.to_vec(),
            previous_package_slugs: previous.to_vec(),
            agents,
            git: git::context_for(directory).ok(),
        };
        let response = self.gateway.pull(&request)?;
        Ok(apply(directory, &response))
    }
}

/// Apply a pull response to the file tree
///
/// Pure file-system work, separated from the network call so tests can feed
/// it canned responses.
pub fn apply(directory: &Path, response: &PullResponse) -> FileOperationResult {
    let mut result = FileOperationResult::default();

    let unique_files = dedup_by_path(&response.file_updates.create_or_update);
    count_artifacts(&unique_files, &mut result);

    result.skill_directories_deleted = delete_skill_folders(directory, &response.skill_folders);

    for file in &unique_files {
        if let Err(message) = create_or_update(directory, file, &mut result) {
            result
                .errors
                .push(format!("Failed to create/update {}: {message}", file.path));
        }
    }

    for file_ref in &response.file_updates.delete {
        if let Err(message) = delete_path(directory, &file_ref.path, &mut result) {
            result
                .errors
                .push(format!("Failed to delete {}: {message}", file_ref.path));
        }
    }

    result
}

/// Keep one entry per path; packages sharing an artifact render it twice
fn dedup_by_path(files: &[RenderedFile]) -> Vec<&RenderedFile> {
    let mut by_path: HashMap<&str, usize> = HashMap::new();
    let mut unique: Vec<&RenderedFile> = Vec::new();
    for file in files {
        match by_path.get(file.path.as_str()) {
            Some(&index) => unique[index] = file,
            None => {
                by_path.insert(&file.path, unique.len());
                unique.push(file);
            }
        }
    }
    unique
}

fn count_artifacts(files: &[&RenderedFile], result: &mut FileOperationResult) {
    for file in files {
        if !file.path.ends_with(".md") {
            continue;
        }
        if file.path.contains(".packmind/recipes/") {
            result.recipes_count += 1;
        } else if file.path.contains(".packmind/standards/") {
            result.standards_count += 1;
        } else if file.path.contains(".packmind/skills/") {
            result.skills_count += 1;
        }
    }
}

/// Remove remote-owned skill folders wholesale, returning how many files
/// went with them. Missing folders are not errors.
fn delete_skill_folders(directory: &Path, folders: &[String]) -> usize {
    let mut deleted = 0;
    for folder in folders {
        let full_path = directory.join(folder);
        if !full_path.exists() {
            continue;
        }
        let file_count = WalkDir::new(&full_path)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .count();
        if fs::remove_dir_all(&full_path).is_ok() {
            deleted += file_count;
        }
    }
    deleted
}

fn create_or_update(
    directory: &Path,
    file: &RenderedFile,
    result: &mut FileOperationResult,
) -> std::result::Result<(), String> {
    let full_path = directory.join(&file.path);
    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).map_err(|err| err.to_string())?;
    }

    let existed = full_path.exists();

    if file.is_base64 {
        let bytes = STANDARD
            .decode(&file.content)
            .map_err(|err| format!("invalid base64 content: {err}"))?;
        fs::write(&full_path, bytes).map_err(|err| err.to_string())?;
        if existed {
            result.files_updated += 1;
        } else {
            result.files_created += 1;
        }
        return Ok(());
    }

    if existed {
        let existing = fs::read_to_string(&full_path).map_err(|err| err.to_string())?;
        let merged = match merge::extract_comment_marker(&file.content) {
            Some(marker) => merge::merge_with_markers(&existing, &file.content, &marker),
            None => file.content.clone(),
        };
        // Unchanged content is neither written nor counted
        if merged != existing {
            fs::write(&full_path, merged).map_err(|err| err.to_string())?;
            result.files_updated += 1;
        }
    } else {
        fs::write(&full_path, &file.content).map_err(|err| err.to_string())?;
        result.files_created += 1;
    }

    Ok(())
}

fn delete_path(
    directory: &Path,
    relative: &str,
    result: &mut FileOperationResult,
) -> std::result::Result<(), String> {
    let full_path = directory.join(relative);
    let Ok(metadata) = fs::metadata(&full_path) else {
        // Already gone
        return Ok(());
    };

    if metadata.is_dir() {
        fs::remove_dir_all(&full_path).map_err(|err| err.to_string())?;
    } else {
        fs::remove_file(&full_path).map_err(|err| err.to_string())?;
    }
    result.files_deleted += 1;
    Ok(())
}
