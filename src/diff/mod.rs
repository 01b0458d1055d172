//! Artefact diff engine
//!
//! Compares local artifact files against the canonical remote rendering and
//! classifies every divergence into a typed [`ArtefactDiff`]. The remote
//! rendering is the baseline: `old_value` is always the server side,
//! `new_value` the local edit.

pub mod grouping;
pub mod skill;

use std::fs;
use std::path::Path;

use crate::domain::change::{Change, ScalarUpdate};
use crate::domain::{ArtefactDiff, ArtifactType};
use crate::error::Result;
use crate::gateway::{PullRequest, PullResponse, RemoteGateway, RenderedFile};
use crate::git::GitContext;

pub struct DiffEngine<'a, G: RemoteGateway> {
    gateway: &'a G,
}

impl<'a, G: RemoteGateway> DiffEngine<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        DiffEngine { gateway }
    }

    /// Compute all divergences for `directory`
    ///
    /// The git context is required: the server resolves the deployed
    /// baseline from the repository location.
    pub fn compute(
        &self,
        directory: &Path,
        packages: &[String],
        agents: Option<Vec<String>>,
        git: GitContext,
    ) -> Result<Vec<ArtefactDiff>> {
        let request = PullRequest {
            package_slugs: packages.to_vec(),
            previous_package_slugs: vec![],
            agents,
            git: Some(git),
        };
        let response = self.gateway.pull(&request)?;
        Ok(compute_diffs(directory, &response))
    }
}

/// Classify every divergence between `directory` and a pull response
pub fn compute_diffs(directory: &Path, response: &PullResponse) -> Vec<ArtefactDiff> {
    let files = &response.file_updates.create_or_update;
    let mut diffs = Vec::new();

    for file in files {
        match file.artifact_type {
            Some(ArtifactType::Command) => {
                diffs.extend(diff_scalar_file(
                    file,
                    directory,
                    Change::UpdateCommandDescription,
                ));
            }
            Some(ArtifactType::Standard) => {
                diffs.extend(diff_scalar_file(
                    file,
                    directory,
                    Change::UpdateStandardDescription,
                ));
            }
            Some(ArtifactType::Skill) => {
                if file.path.ends_with("/SKILL.md") {
                    diffs.extend(skill::diff_skill_md(file, directory));
                } else {
                    diffs.extend(skill::diff_skill_file(
                        file,
                        directory,
                        &response.skill_folders,
                    ));
                }
            }
            // Infrastructure files are the sync engine's concern
            None => {}
        }
    }

    diffs.extend(skill::diff_new_files(
        &response.skill_folders,
        files,
        directory,
    ));

    diffs
}

/// Whole-content comparison for command and standard files
///
/// A file missing locally contributes no diff; creating it is sync's job.
fn diff_scalar_file(
    file: &RenderedFile,
    directory: &Path,
    kind: fn(ScalarUpdate) -> Change,
) -> Option<ArtefactDiff> {
    let artifact_name = file.artifact_name.as_deref()?;
    let artifact_type = file.artifact_type?;
    let local_content = fs::read_to_string(directory.join(&file.path)).ok()?;

    if local_content == file.content {
        return None;
    }

    Some(ArtefactDiff {
        file_path: file.path.clone(),
        change: kind(ScalarUpdate {
            old_value: file.content.clone(),
            new_value: local_content,
        }),
        artifact_name: artifact_name.to_string(),
        artifact_type,
        artifact_id: file.artifact_id.clone(),
        space_id: file.space_id.clone(),
    })
}
