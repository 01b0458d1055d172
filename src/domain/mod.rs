//! Core domain types shared by the sync, diff and submission engines
//!
//! This module is organized by concern:
//! - [`artifact`]: artifact identity and skill file items
//! - [`change`]: the tagged change union carried by diff records
//! - [`outcome`]: operation results and submission outcomes

pub mod artifact;
pub mod change;
pub mod outcome;

pub use artifact::{ArtifactType, SkillFileItem};
pub use change::{ArtefactDiff, Change, FileContentUpdate, ItemChange, ScalarUpdate, TargetedUpdate};
pub use outcome::{FileOperationResult, ProposalError, SkippedProposal, SubmissionOutcome};
