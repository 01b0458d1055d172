//! Result and outcome types returned by the engines

use serde::{Deserialize, Serialize};

use super::artifact::ArtifactType;

/// Outcome of one sync operation over a single directory
///
/// Counts are final once returned. File-level failures accumulate in
/// `errors` instead of aborting the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOperationResult {
    pub files_created: usize,
    pub files_updated: usize,
    pub files_deleted: usize,
    pub recipes_count: usize,
    pub standards_count: usize,
    pub skills_count: usize,
    pub skill_directories_deleted: usize,
    pub errors: Vec<String>,
}

impl FileOperationResult {
    /// Whether the sync touched the file tree at all
    pub fn has_changes(&self) -> bool {
        self.files_created + self.files_updated + self.files_deleted + self.skill_directories_deleted
            > 0
    }

    /// Deletions including files removed with whole skill directories
    pub fn total_deleted(&self) -> usize {
        self.files_deleted + self.skill_directories_deleted
    }
}

/// A proposal the server (or the pre-check) declined without treating it as
/// an error
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SkippedProposal {
    pub name: String,
    pub reason: String,
}

/// A per-artifact submission failure reported by the server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalError {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<ArtifactType>,
}

impl ProposalError {
    /// Whether the local content no longer matches the remote baseline
    pub fn is_payload_mismatch(&self) -> bool {
        self.code.as_deref() == Some("ChangeProposalPayloadMismatchError")
    }
}

/// Aggregated outcome of one submission call across all artifact groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub submitted: usize,
    pub already_submitted: usize,
    pub skipped: Vec<SkippedProposal>,
    pub errors: Vec<ProposalError>,
}

impl SubmissionOutcome {
    /// Fold a batch outcome into the running aggregate
    pub fn merge(&mut self, other: SubmissionOutcome) {
        self.submitted += other.submitted;
        self.already_submitted += other.already_submitted;
        self.skipped.extend(other.skipped);
        self.errors.extend(other.errors);
    }
}
