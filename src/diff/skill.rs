//! Skill diffing
//!
//! SKILL.md carries YAML frontmatter plus a prompt body; each frontmatter
//! field diffs independently so one edit never drags the whole file into a
//! proposal. Every other file in a skill folder diffs as a unit.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::change::{Change, FileContentUpdate, ItemChange, ScalarUpdate, TargetedUpdate};
use crate::domain::{ArtefactDiff, ArtifactType, SkillFileItem};
use crate::gateway::RenderedFile;

/// Parsed view of a SKILL.md document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSkillMd {
    pub name: String,
    pub description: String,
    /// Prompt text after the frontmatter
    pub body: String,
    /// Canonical JSON of the `metadata` mapping, `{}` when absent
    pub metadata_json: String,
    pub license: String,
    pub compatibility: String,
    pub allowed_tools: String,
}

#[derive(Deserialize, Default)]
struct Frontmatter {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    metadata: Option<serde_yaml::Value>,
    #[serde(default)]
    license: String,
    #[serde(default)]
    compatibility: Option<serde_yaml::Value>,
    #[serde(default, alias = "allowed-tools", alias = "allowedTools")]
    allowed_tools: Option<AllowedTools>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AllowedTools {
    One(String),
    Many(Vec<String>),
}

/// Parse a SKILL.md document; `None` when the frontmatter is absent or not
/// valid YAML
pub fn parse_skill_md(content: &str) -> Option<ParsedSkillMd> {
    let (frontmatter, body) = split_frontmatter(content)?;
    let parsed: Frontmatter = serde_yaml::from_str(frontmatter).ok()?;

    let metadata_json = match parsed.metadata {
        Some(value) => serde_json::to_string(&value).ok()?,
        None => "{}".to_string(),
    };
    let compatibility = match parsed.compatibility {
        Some(serde_yaml::Value::String(text)) => text,
        Some(value) => serde_json::to_string(&value).ok()?,
        None => String::new(),
    };
    let allowed_tools = match parsed.allowed_tools {
        Some(AllowedTools::One(text)) => text,
        Some(AllowedTools::Many(items)) => items.join(", "),
        None => String::new(),
    };

    Some(ParsedSkillMd {
        name: parsed.name,
        description: parsed.description,
        body: body.trim_start_matches('\n').to_string(),
        metadata_json,
        license: parsed.license,
        compatibility,
        allowed_tools,
    })
}

/// Content with a leading `---` frontmatter block removed
pub fn strip_frontmatter(content: &str) -> &str {
    match split_frontmatter(content) {
        Some((_, body)) => body.trim_start_matches('\n'),
        None => content,
    }
}

fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---\n").or_else(|| {
        content
            .strip_prefix("---\r\n")
    })?;
    let end = rest.find("\n---")?;
    let frontmatter = &rest[..end];
    let after = &rest[end + 4..];
    let body = after.strip_prefix('\r').unwrap_or(after);
    Some((frontmatter, body))
}

struct BaseDiff<'a> {
    file: &'a RenderedFile,
    artifact_name: &'a str,
}

impl BaseDiff<'_> {
    fn build(&self, change: Change) -> ArtefactDiff {
        ArtefactDiff {
            file_path: self.file.path.clone(),
            change,
            artifact_name: self.artifact_name.to_string(),
            artifact_type: ArtifactType::Skill,
            artifact_id: self.file.artifact_id.clone(),
            space_id: self.file.space_id.clone(),
        }
    }
}

/// Diff one remote SKILL.md against its local copy
pub fn diff_skill_md(file: &RenderedFile, directory: &Path) -> Vec<ArtefactDiff> {
    let Some(artifact_name) = file.artifact_name.as_deref() else {
        return vec![];
    };
    let Ok(local_content) = fs::read_to_string(directory.join(&file.path)) else {
        return vec![];
    };

    let base = BaseDiff {
        file,
        artifact_name,
    };

    let (Some(remote), Some(local)) = (parse_skill_md(&file.content), parse_skill_md(&local_content))
    else {
        // Parsing failed on either side, compare whole bodies instead
        let remote_body = strip_frontmatter(&file.content);
        let local_body = strip_frontmatter(&local_content);
        if remote_body == local_body {
            return vec![];
        }
        return vec![base.build(Change::UpdateSkillPrompt(ScalarUpdate {
            old_value: remote_body.to_string(),
            new_value: local_body.to_string(),
        }))];
    };

    let fields: [(fn(ScalarUpdate) -> Change, &str, &str); 7] = [
        (Change::UpdateSkillName, &remote.name, &local.name),
        (
            Change::UpdateSkillDescription,
            &remote.description,
            &local.description,
        ),
        (Change::UpdateSkillPrompt, &remote.body, &local.body),
        (
            Change::UpdateSkillMetadata,
            &remote.metadata_json,
            &local.metadata_json,
        ),
        (Change::UpdateSkillLicense, &remote.license, &local.license),
        (
            Change::UpdateSkillCompatibility,
            &remote.compatibility,
            &local.compatibility,
        ),
        (
            Change::UpdateSkillAllowedTools,
            &remote.allowed_tools,
            &local.allowed_tools,
        ),
    ];

    fields
        .into_iter()
        .filter(|(_, old, new)| old != new)
        .map(|(kind, old, new)| {
            base.build(kind(ScalarUpdate {
                old_value: old.to_string(),
                new_value: new.to_string(),
            }))
        })
        .collect()
}

/// Diff one non-SKILL.md skill file against its local copy
pub fn diff_skill_file(
    file: &RenderedFile,
    directory: &Path,
    skill_folders: &[String],
) -> Vec<ArtefactDiff> {
    let (Some(artifact_name), Some(skill_file_id)) =
        (file.artifact_name.as_deref(), file.skill_file_id.as_deref())
    else {
        return vec![];
    };

    let base = BaseDiff {
        file,
        artifact_name,
    };
    let full_path = directory.join(&file.path);
    let relative = folder_relative_path(&file.path, skill_folders);

    let Ok(local_content) = fs::read_to_string(&full_path) else {
        // Missing locally means the user removed it
        return vec![base.build(Change::DeleteSkillFile(ItemChange {
            target_id: skill_file_id.to_string(),
            item: SkillFileItem {
                path: relative,
                content: file.content.clone(),
                permissions: file
                    .skill_file_permissions
                    .clone()
                    .unwrap_or_else(|| "read".to_string()),
                is_base64: file.is_base64,
            },
        }))];
    };

    let mut diffs = Vec::new();

    if local_content != file.content {
        diffs.push(base.build(Change::UpdateSkillFileContent(FileContentUpdate {
            target_id: skill_file_id.to_string(),
            old_value: file.content.clone(),
            new_value: local_content,
            is_base64: file.is_base64,
        })));
    }

    if let Some(remote_permissions) = file.skill_file_permissions.as_deref() {
        if let Some(local_permissions) = read_permissions(&full_path) {
            if local_permissions != remote_permissions {
                diffs.push(base.build(Change::UpdateSkillFilePermissions(TargetedUpdate {
                    target_id: skill_file_id.to_string(),
                    old_value: remote_permissions.to_string(),
                    new_value: local_permissions,
                })));
            }
        }
    }

    diffs
}

/// Detect local files added into remote-declared skill folders
///
/// SKILL.md never counts as an addition and folders without a remote
/// SKILL.md contribute nothing, since there is no artifact to attach to.
pub fn diff_new_files(
    skill_folders: &[String],
    files: &[RenderedFile],
    directory: &Path,
) -> Vec<ArtefactDiff> {
    let mut diffs = Vec::new();

    for folder in skill_folders {
        let skill_md_path = format!("{folder}/SKILL.md");
        let Some(skill_md) = files.iter().find(|file| {
            file.path == skill_md_path && file.artifact_type == Some(ArtifactType::Skill)
        }) else {
            continue;
        };
        let Some(artifact_name) = skill_md.artifact_name.as_deref() else {
            continue;
        };

        let remote_paths: Vec<&str> = files
            .iter()
            .filter(|file| file.path.starts_with(&format!("{folder}/")))
            .map(|file| file.path.as_str())
            .collect();

        let folder_path = directory.join(folder);
        for relative in list_files_recursively(&folder_path) {
            if relative == "SKILL.md" {
                continue;
            }
            let file_path = format!("{folder}/{relative}");
            if remote_paths.contains(&file_path.as_str()) {
                continue;
            }
            let full_path = directory.join(&file_path);
            let Ok(content) = fs::read_to_string(&full_path) else {
                continue;
            };
            let permissions =
                read_permissions(&full_path).unwrap_or_else(|| "rw-r--r--".to_string());

            diffs.push(ArtefactDiff {
                file_path,
                change: Change::AddSkillFile(ItemChange {
                    target_id: relative.clone(),
                    item: SkillFileItem {
                        path: relative,
                        content,
                        permissions,
                        is_base64: false,
                    },
                }),
                artifact_name: artifact_name.to_string(),
                artifact_type: ArtifactType::Skill,
                artifact_id: skill_md.artifact_id.clone(),
                space_id: skill_md.space_id.clone(),
            });
        }
    }

    diffs
}

/// Path of `file_path` relative to its owning skill folder
fn folder_relative_path(file_path: &str, skill_folders: &[String]) -> String {
    for folder in skill_folders {
        if let Some(relative) = file_path.strip_prefix(&format!("{folder}/")) {
            return relative.to_string();
        }
    }
    // Skill files live under a 3-segment prefix (.claude/skills/<slug>/)
    file_path.splitn(4, '/').nth(3).unwrap_or(file_path).to_string()
}

fn list_files_recursively(folder: &Path) -> Vec<String> {
    walkdir::WalkDir::new(folder)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(folder)
                .ok()
                .map(|relative| {
                    relative
                        .components()
                        .map(|component| component.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                })
        })
        .collect()
}

#[cfg(unix)]
fn read_permissions(path: &Path) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path).ok()?.permissions().mode();
    Some(format_mode(mode))
}

#[cfg(not(unix))]
fn read_permissions(_path: &Path) -> Option<String> {
    None
}

/// `rwxr-xr-x` rendering of the lower nine mode bits
#[cfg(unix)]
fn format_mode(mode: u32) -> String {
    const CHARS: [char; 3] = ['r', 'w', 'x'];
    (0..9)
        .map(|position| {
            let bit = 8 - position;
            if mode & (1 << bit) != 0 {
                CHARS[position % 3]
            } else {
                '-'
            }
        })
        .collect()
}
