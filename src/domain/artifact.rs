//! Artifact identity types

use serde::{Deserialize, Serialize};

/// Kind of reusable instructional content an artifact file belongs to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    Command,
    Skill,
    Standard,
}

impl ArtifactType {
    /// Human-readable label used in diff reports
    pub fn label(self) -> &'static str {
        match self {
            ArtifactType::Command => "Command",
            ArtifactType::Skill => "Skill",
            ArtifactType::Standard => "Standard",
        }
    }

    /// Wire identifier, matching the serde rendering
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactType::Command => "command",
            ArtifactType::Skill => "skill",
            ArtifactType::Standard => "standard",
        }
    }
}

/// A whole skill file carried inside add/delete change payloads
///
/// `path` is relative to the owning skill folder. Binary files carry
/// base64-encoded content and set `is_base64`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkillFileItem {
    pub path: String,
    pub content: String,
    pub permissions: String,
    #[serde(default)]
    pub is_base64: bool,
}
