//! Typed change records produced by the artefact diff engine
//!
//! Every change kind carries exactly the payload that kind needs, so the
//! shape of a record is fixed by its tag rather than discovered at runtime.

use serde::{Deserialize, Serialize};

use super::artifact::{ArtifactType, SkillFileItem};

/// Old/new pair for a scalar field or whole-file content update
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScalarUpdate {
    pub old_value: String,
    pub new_value: String,
}

/// Old/new pair targeting one file of a multi-file skill
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetedUpdate {
    pub target_id: String,
    pub old_value: String,
    pub new_value: String,
}

/// Content update for one skill file; binary files keep the boolean flag
/// so the values are never rendered as a text diff
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileContentUpdate {
    pub target_id: String,
    pub old_value: String,
    pub new_value: String,
    #[serde(default)]
    pub is_base64: bool,
}

/// A whole file added to or removed from a skill
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemChange {
    pub target_id: String,
    pub item: SkillFileItem,
}

/// One semantic change to an artifact, tagged by kind
///
/// Serialization yields `{"type": ..., "payload": ...}`, which is also the
/// wire shape the change-proposal API expects and the key used to collapse
/// identical changes rendered into several agent-specific files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Change {
    UpdateCommandDescription(ScalarUpdate),
    UpdateStandardDescription(ScalarUpdate),
    UpdateSkillName(ScalarUpdate),
    UpdateSkillDescription(ScalarUpdate),
    UpdateSkillPrompt(ScalarUpdate),
    UpdateSkillMetadata(ScalarUpdate),
    UpdateSkillLicense(ScalarUpdate),
    UpdateSkillCompatibility(ScalarUpdate),
    UpdateSkillAllowedTools(ScalarUpdate),
    UpdateSkillFileContent(FileContentUpdate),
    UpdateSkillFilePermissions(TargetedUpdate),
    AddSkillFile(ItemChange),
    DeleteSkillFile(ItemChange),
}

impl Change {
    /// Human-readable label used in diff reports
    pub fn label(&self) -> &'static str {
        match self {
            Change::UpdateCommandDescription(_) => "command instructions changed",
            Change::UpdateStandardDescription(_) => "standard content changed",
            Change::UpdateSkillName(_) => "skill name changed",
            Change::UpdateSkillDescription(_) => "skill description changed",
            Change::UpdateSkillPrompt(_) => "skill prompt changed",
            Change::UpdateSkillMetadata(_) => "skill metadata changed",
            Change::UpdateSkillLicense(_) => "skill license changed",
            Change::UpdateSkillCompatibility(_) => "skill compatibility changed",
            Change::UpdateSkillAllowedTools(_) => "skill allowed tools changed",
            Change::UpdateSkillFileContent(_) => "skill file content changed",
            Change::UpdateSkillFilePermissions(_) => "skill file permissions changed",
            Change::AddSkillFile(_) => "skill file added",
            Change::DeleteSkillFile(_) => "skill file deleted",
        }
    }

    /// Serialized `(type, payload)` key used for sub-grouping
    ///
    /// Two diffs with identical keys represent the same semantic change
    /// rendered at different file paths.
    pub fn dedup_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// One detected divergence between a local artifact file and its canonical
/// remote rendering
///
/// `artifact_id` and `space_id` come from the remote rendering; records
/// without them cannot be submitted as change proposals and are reported as
/// not-submittable instead.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtefactDiff {
    pub file_path: String,
    #[serde(flatten)]
    pub change: Change,
    pub artifact_name: String,
    pub artifact_type: ArtifactType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

impl ArtefactDiff {
    /// Key grouping all diffs that belong to the same logical artifact
    pub fn artifact_key(&self) -> (ArtifactType, String) {
        (self.artifact_type, self.artifact_name.clone())
    }

    /// Whether the record carries everything the change-proposal API needs
    pub fn is_submittable(&self) -> bool {
        self.artifact_id.is_some() && self.space_id.is_some()
    }
}
