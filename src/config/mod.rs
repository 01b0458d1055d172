//! `packmind.json` configuration files
//!
//! One file per directory that opts into sync. The schema is fixed
//! externally: a JSON object mapping package slug to a version specifier,
//! optionally naming the coding agents content is rendered for.

pub mod resolver;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PackmindError, Result};
use crate::ui;

/// Configuration filename, fixed by the backend contract
pub const CONFIG_FILENAME: &str = "packmind.json";

/// Coding agents artifacts can be rendered for
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CodingAgent {
    Packmind,
    Junie,
    Claude,
    Cursor,
    Copilot,
    AgentsMd,
    GitlabDuo,
    Continue,
}

impl CodingAgent {
    /// Identifier used in configuration files and API requests
    pub fn as_str(self) -> &'static str {
        match self {
            CodingAgent::Packmind => "packmind",
            CodingAgent::Junie => "junie",
            CodingAgent::Claude => "claude",
            CodingAgent::Cursor => "cursor",
            CodingAgent::Copilot => "copilot",
            CodingAgent::AgentsMd => "agents_md",
            CodingAgent::GitlabDuo => "gitlab_duo",
            CodingAgent::Continue => "continue",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "packmind" => Some(CodingAgent::Packmind),
            "junie" => Some(CodingAgent::Junie),
            "claude" => Some(CodingAgent::Claude),
            "cursor" => Some(CodingAgent::Cursor),
            "copilot" => Some(CodingAgent::Copilot),
            "agents_md" => Some(CodingAgent::AgentsMd),
            "gitlab_duo" => Some(CodingAgent::GitlabDuo),
            "continue" => Some(CodingAgent::Continue),
            _ => None,
        }
    }
}

impl fmt::Display for CodingAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed content of one `packmind.json`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackmindConfig {
    /// Package slug -> version specifier (insertion order is insignificant)
    pub packages: BTreeMap<String, String>,
    /// Target coding agents; absent means the organization default applies
    pub agents: Option<Vec<CodingAgent>>,
}

impl PackmindConfig {
    /// Package slugs in deterministic (alphabetical) order
    pub fn package_slugs(&self) -> Vec<String> {
        self.packages.keys().cloned().collect()
    }

    /// Whether any declared version specifier is narrower than `*`
    pub fn has_pinned_versions(&self) -> bool {
        self.packages.values().any(|version| version != "*")
    }

    /// Build a config installing `slugs` at the wildcard version
    pub fn with_packages(slugs: &[String]) -> Self {
        PackmindConfig {
            packages: slugs
                .iter()
                .map(|slug| (slug.clone(), "*".to_string()))
                .collect(),
            agents: None,
        }
    }

    /// Agent identifiers for API requests, if any are configured
    pub fn agent_ids(&self) -> Option<Vec<String>> {
        self.agents
            .as_ref()
            .map(|agents| agents.iter().map(|agent| agent.to_string()).collect())
    }
}

/// Raw schema as it appears on disk
#[derive(Deserialize)]
struct RawConfig {
    packages: BTreeMap<String, String>,
    #[serde(default)]
    agents: Option<Vec<String>>,
}

#[derive(Serialize)]
struct RawConfigOut<'a> {
    packages: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agents: Option<Vec<&'static str>>,
}

/// Path of the configuration file inside `directory`
pub fn config_path(directory: &Path) -> PathBuf {
    directory.join(CONFIG_FILENAME)
}

/// Whether `directory` carries a configuration file
pub fn exists(directory: &Path) -> bool {
    config_path(directory).exists()
}

/// Read the configuration for `directory`
///
/// Returns `Ok(None)` when the file is absent ("not managed"). A malformed
/// file is an error here; tree scans that want to skip malformed files use
/// [`read_lenient`] instead.
pub fn read(directory: &Path) -> Result<Option<PackmindConfig>> {
    let path = config_path(directory);

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(PackmindError::ConfigReadFailed {
                path: path.display().to_string(),
                reason: err.to_string(),
            });
        }
    };

    parse(&content, &path).map(Some)
}

/// Read the configuration for `directory`, skipping malformed files with a
/// warning instead of failing
pub fn read_lenient(directory: &Path) -> Option<PackmindConfig> {
    let path = config_path(directory);
    let content = fs::read_to_string(&path).ok()?;

    match parse(&content, &path) {
        Ok(config) => Some(config),
        Err(_) => {
            ui::warn(&format!(
                "Skipping malformed config file: {}",
                path.display()
            ));
            None
        }
    }
}

/// Write `config` into `directory`, replacing any existing file
pub fn write(directory: &Path, config: &PackmindConfig) -> Result<()> {
    let path = config_path(directory);
    let raw = RawConfigOut {
        packages: &config.packages,
        agents: config
            .agents
            .as_ref()
            .map(|agents| agents.iter().map(|agent| agent.as_str()).collect()),
    };

    let mut content = serde_json::to_string_pretty(&raw).map_err(|err| {
        PackmindError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    })?;
    content.push('\n');

    fs::write(&path, content).map_err(|err| PackmindError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

fn parse(content: &str, path: &Path) -> Result<PackmindConfig> {
    let raw: RawConfig =
        serde_json::from_str(content).map_err(|err| PackmindError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

    let agents = raw.agents.map(|names| {
        let (valid, invalid): (Vec<_>, Vec<_>) = names
            .iter()
            .map(|name| (CodingAgent::parse(name), name))
            .partition(|(parsed, _)| parsed.is_some());

        if !invalid.is_empty() {
            let names: Vec<&str> = invalid.iter().map(|(_, name)| name.as_str()).collect();
            ui::warn(&format!(
                "Invalid agent(s) in {}: {}. Valid agents are: packmind, junie, claude, cursor, \
                 copilot, agents_md, gitlab_duo, continue",
                path.display(),
                names.join(", ")
            ));
        }

        valid.into_iter().filter_map(|(parsed, _)| parsed).collect()
    });

    Ok(PackmindConfig {
        packages: raw.packages,
        agents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_config_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(read(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_read_valid_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            config_path(temp.path()),
            r#"{"packages": {"backend": "*", "frontend": "*"}}"#,
        )
        .unwrap();

        let config = read(temp.path()).unwrap().unwrap();
        assert_eq!(config.package_slugs(), vec!["backend", "frontend"]);
        assert!(config.agents.is_none());
    }

    #[test]
    fn test_read_malformed_config_is_error() {
        let temp = TempDir::new().unwrap();
        fs::write(config_path(temp.path()), "{not json").unwrap();

        let err = read(temp.path()).unwrap_err();
        assert!(matches!(err, PackmindError::ConfigParseFailed { .. }));
    }

    #[test]
    fn test_read_missing_packages_field_is_error() {
        let temp = TempDir::new().unwrap();
        fs::write(config_path(temp.path()), r#"{"agents": ["claude"]}"#).unwrap();

        assert!(read(temp.path()).is_err());
    }

    #[test]
    fn test_read_lenient_skips_malformed() {
        let temp = TempDir::new().unwrap();
        fs::write(config_path(temp.path()), "{not json").unwrap();

        assert!(read_lenient(temp.path()).is_none());
    }

    #[test]
    fn test_invalid_agents_are_dropped() {
        let temp = TempDir::new().unwrap();
        fs::write(
            config_path(temp.path()),
            r#"{"packages": {}, "agents": ["claude", "hal9000"]}"#,
        )
        .unwrap();

        let config = read(temp.path()).unwrap().unwrap();
        assert_eq!(config.agents, Some(vec![CodingAgent::Claude]));
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let temp = TempDir::new().unwrap();
        let mut config = PackmindConfig::with_packages(&["backend".to_string()]);
        config.agents = Some(vec![CodingAgent::Cursor, CodingAgent::Claude]);

        write(temp.path(), &config).unwrap();
        let loaded = read(temp.path()).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_pinned_version_detection() {
        let mut config = PackmindConfig::with_packages(&["backend".to_string()]);
        assert!(!config.has_pinned_versions());

        config
            .packages
            .insert("frontend".to_string(), "1.2.0".to_string());
        assert!(config.has_pinned_versions());
    }
}
