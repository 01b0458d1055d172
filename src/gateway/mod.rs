//! Remote content API
//!
//! [`RemoteGateway`] is the seam between the engines and the Packmind
//! server. The engines only ever see these DTOs; the HTTP wiring lives in
//! [`http`]. Tests substitute an in-memory implementation.

pub mod http;

use serde::{Deserialize, Serialize};

use crate::domain::change::Change;
use crate::domain::ArtifactType;
use crate::error::Result;
use crate::git::GitContext;

pub use http::HttpGateway;

/// Parameters of one pull request for rendered package content
#[derive(Debug, Clone, Default)]
pub struct PullRequest {
    /// Packages the directory should end up with
    pub package_slugs: Vec<String>,
    /// Packages the directory had before, for server-side delta computation
    pub previous_package_slugs: Vec<String>,
    /// Coding agents to render for; `None` uses the organization default
    pub agents: Option<Vec<String>>,
    /// Deployment target, when the directory sits inside a git repository
    pub git: Option<GitContext>,
}

/// One file in the canonical remote rendering
///
/// The artifact metadata fields are populated for artifact files and drive
/// the diff engine; plain infrastructure files carry only `path` and
/// `content`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenderedFile {
    pub path: String,
    pub content: String,
    #[serde(default)]
    pub is_base64: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<ArtifactType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    /// Stable id of a skill file, present on skill files other than SKILL.md
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_file_id: Option<String>,
    /// Canonical permission string (`rwxr-xr-x`), when the server declares one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_file_permissions: Option<String>,
}

/// A file or directory the remote wants removed
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub path: String,
}

/// Create/update and delete lists of one rendering
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileUpdates {
    #[serde(default)]
    pub create_or_update: Vec<RenderedFile>,
    #[serde(default)]
    pub delete: Vec<FileRef>,
}

/// Full response of a pull request
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PullResponse {
    pub file_updates: FileUpdates,
    /// Skill folders owned by the desired packages, relative to the target
    /// directory; deleted and re-created wholesale by the sync engine
    #[serde(default)]
    pub skill_folders: Vec<String>,
}

/// One change proposal on the wire
///
/// `Change` flattens into `type`/`payload`, matching the batch API shape.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    #[serde(flatten)]
    pub change: Change,
    pub artefact_id: String,
    pub capture_mode: CaptureMode,
    pub message: String,
}

/// How a proposal was captured; the CLI always submits committed local state
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Commit,
}

/// Existence record for one checked proposal, indexed into the request batch
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalExistence {
    pub index: usize,
    pub exists: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CheckProposalsResponse {
    #[serde(default)]
    pub results: Vec<ProposalExistence>,
}

/// Per-proposal failure inside an otherwise successful batch
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    pub index: usize,
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Server-side outcome of one submission batch
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSubmitResponse {
    pub created: usize,
    #[serde(default)]
    pub skipped: usize,
    #[serde(default)]
    pub errors: Vec<BatchError>,
}

/// Acknowledgement of a distribution notification
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReceipt {
    #[serde(default)]
    pub deployment_id: Option<String>,
}

/// One package as returned by the listing endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ListPackagesResponse {
    #[serde(default)]
    pub packages: Vec<PackageSummary>,
}

/// A named artifact inside a package summary
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SummarizedArtifact {
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Detailed package view shown by `show`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetails {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub standards: Vec<SummarizedArtifact>,
    /// Commands keep their historical wire name
    #[serde(default, rename = "recipes")]
    pub commands: Vec<SummarizedArtifact>,
}

/// Notification payload sent after a sync that changed files
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport<'a> {
    pub distributed_packages: &'a [String],
    pub git_remote_url: &'a str,
    pub git_branch: &'a str,
    pub relative_path: &'a str,
}

/// Operations the engines need from the Packmind server
pub trait RemoteGateway {
    /// Fetch the rendered file set for a package selection
    fn pull(&self, request: &PullRequest) -> Result<PullResponse>;

    /// All packages visible to the organization
    fn list_packages(&self) -> Result<Vec<PackageSummary>>;

    /// Summary of one package by slug
    fn package_details(&self, slug: &str) -> Result<PackageDetails>;

    /// Record that packages were distributed to a repository location
    fn notify_distribution(&self, report: &DistributionReport<'_>) -> Result<DeploymentReceipt>;

    /// Ask which of `proposals` already exist for `space_id`
    fn check_proposals(
        &self,
        space_id: &str,
        proposals: &[ProposalRequest],
    ) -> Result<Vec<ProposalExistence>>;

    /// Submit a proposal batch for `space_id`
    fn submit_proposals(
        &self,
        space_id: &str,
        proposals: &[ProposalRequest],
    ) -> Result<BatchSubmitResponse>;
}
