//! Change-proposal submission
//!
//! Two passes over artifact groups: `check_diffs` asks which proposals the
//! server already has (so re-running `diff` never duplicates), and
//! `submit_diffs` sends the rest, one batch per space. Diffs without
//! artifact/space ids have nothing to attach to and never reach the
//! network; standards are checked for existence but have no proposal flow,
//! so submission skips them.

use crate::domain::{ArtefactDiff, ArtifactType, ProposalError, SkippedProposal, SubmissionOutcome};
use crate::error::Result;
use crate::gateway::{CaptureMode, ProposalExistence, ProposalRequest, RemoteGateway};

/// Existence status of one diff on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffExistence {
    pub diff: ArtefactDiff,
    pub exists: bool,
    pub created_at: Option<String>,
}

const UNSUPPORTED_TYPE: &str = "Only commands and skills are supported";
const MISSING_METADATA: &str = "Missing artifact metadata";

fn checkable(diff: &ArtefactDiff) -> std::result::Result<(), &'static str> {
    if !diff.is_submittable() {
        return Err(MISSING_METADATA);
    }
    Ok(())
}

fn submittable(diff: &ArtefactDiff) -> std::result::Result<(), &'static str> {
    if diff.artifact_type == ArtifactType::Standard {
        return Err(UNSUPPORTED_TYPE);
    }
    checkable(diff)
}

fn proposal_for(diff: &ArtefactDiff, message: &str) -> ProposalRequest {
    ProposalRequest {
        change: diff.change.clone(),
        // Guarded by the validity checks before any proposal is built
        artefact_id: diff.artifact_id.clone().unwrap_or_default(),
        capture_mode: CaptureMode::Commit,
        message: message.to_string(),
    }
}

/// Grouped diff indices keyed by space id, insertion-ordered
fn partition_by_space<'a>(
    diffs: impl Iterator<Item = (usize, &'a ArtefactDiff)>,
) -> Vec<(&'a str, Vec<usize>)> {
    let mut spaces: Vec<(&str, Vec<usize>)> = Vec::new();
    for (index, diff) in diffs {
        let Some(space_id) = diff.space_id.as_deref() else {
            continue;
        };
        match spaces.iter_mut().find(|(existing, _)| *existing == space_id) {
            Some((_, indices)) => indices.push(index),
            None => spaces.push((space_id, vec![index])),
        }
    }
    spaces
}

/// Ask the server which of the grouped diffs already exist as proposals
///
/// Diffs without artifact metadata report `exists: false` without a network
/// call. One request per space id; result order follows input order within
/// each group.
pub fn check_diffs<G: RemoteGateway>(
    gateway: &G,
    grouped_diffs: &[Vec<ArtefactDiff>],
) -> Result<Vec<DiffExistence>> {
    let mut results = Vec::new();

    for group in grouped_diffs {
        let spaces = partition_by_space(
            group
                .iter()
                .enumerate()
                .filter(|(_, diff)| checkable(diff).is_ok()),
        );

        let mut records: Vec<Option<ProposalExistence>> = vec![None; group.len()];
        for (space_id, indices) in spaces {
            let proposals: Vec<ProposalRequest> = indices
                .iter()
                .map(|&index| proposal_for(&group[index], ""))
                .collect();
            for item in gateway.check_proposals(space_id, &proposals)? {
                if let Some(&group_index) = indices.get(item.index) {
                    records[group_index] = Some(item);
                }
            }
        }

        for (index, diff) in group.iter().enumerate() {
            let record = records[index].as_ref();
            results.push(DiffExistence {
                diff: diff.clone(),
                exists: record.is_some_and(|item| item.exists),
                created_at: record.and_then(|item| item.created_at.clone()),
            });
        }
    }

    Ok(results)
}

/// Submit the grouped diffs as change proposals
///
/// One batch per space id within each group; a failing proposal inside a
/// batch becomes a per-artifact error and never blocks its siblings.
pub fn submit_diffs<G: RemoteGateway>(
    gateway: &G,
    grouped_diffs: &[Vec<ArtefactDiff>],
    message: &str,
) -> Result<SubmissionOutcome> {
    let mut outcome = SubmissionOutcome::default();

    for group in grouped_diffs {
        for diff in group {
            if let Err(reason) = submittable(diff) {
                outcome.skipped.push(SkippedProposal {
                    name: diff.artifact_name.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        let spaces = partition_by_space(
            group
                .iter()
                .enumerate()
                .filter(|(_, diff)| submittable(diff).is_ok()),
        );

        for (space_id, indices) in spaces {
            let proposals: Vec<ProposalRequest> = indices
                .iter()
                .map(|&index| proposal_for(&group[index], message))
                .collect();
            let response = gateway.submit_proposals(space_id, &proposals)?;

            let mut batch = SubmissionOutcome {
                submitted: response.created,
                already_submitted: response.skipped,
                ..Default::default()
            };
            for error in response.errors {
                let diff = indices.get(error.index).map(|&index| &group[index]);
                batch.errors.push(ProposalError {
                    name: diff.map_or_else(String::new, |diff| diff.artifact_name.clone()),
                    message: error.message,
                    code: error.code,
                    artifact_type: diff.map(|diff| diff.artifact_type),
                });
            }
            outcome.merge(batch);
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::change::{Change, ScalarUpdate};
    use crate::gateway::{BatchError, BatchSubmitResponse, ProposalExistence};
    use crate::test_support::MockGateway;

    fn command_diff(path: &str, name: &str, ids: Option<(&str, &str)>) -> ArtefactDiff {
        ArtefactDiff {
            file_path: path.to_string(),
            change: Change::UpdateCommandDescription(ScalarUpdate {
                old_value: "old".to_string(),
                new_value: "new".to_string(),
            }),
            artifact_name: name.to_string(),
            artifact_type: ArtifactType::Command,
            artifact_id: ids.map(|(artifact, _)| artifact.to_string()),
            space_id: ids.map(|(_, space)| space.to_string()),
        }
    }

    #[test]
    fn test_empty_groups_submit_nothing() {
        let gateway = MockGateway::default();
        let outcome = submit_diffs(&gateway, &[], "").unwrap();

        assert_eq!(outcome.submitted, 0);
        assert!(outcome.skipped.is_empty());
        assert!(gateway.submitted.borrow().is_empty());
    }

    #[test]
    fn test_group_submits_one_batch_per_space() {
        let gateway = MockGateway::default();
        let group = vec![
            command_diff(".packmind/commands/a.md", "A", Some(("art-a", "spc-1"))),
            command_diff(".cursor/commands/packmind/a.md", "A", Some(("art-a", "spc-1"))),
        ];

        let outcome = submit_diffs(&gateway, &[group], "").unwrap();

        assert_eq!(outcome.submitted, 2);
        let submitted = gateway.submitted.borrow();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0, "spc-1");
        assert_eq!(submitted[0].1.len(), 2);
    }

    #[test]
    fn test_standard_diffs_are_skipped() {
        let gateway = MockGateway::default();
        let mut standard =
            command_diff(".packmind/standards/s.md", "My Standard", Some(("a", "s")));
        standard.artifact_type = ArtifactType::Standard;

        let outcome = submit_diffs(&gateway, &[vec![standard]], "").unwrap();

        assert_eq!(outcome.submitted, 0);
        assert_eq!(
            outcome.skipped,
            vec![SkippedProposal {
                name: "My Standard".to_string(),
                reason: UNSUPPORTED_TYPE.to_string(),
            }]
        );
        assert!(gateway.submitted.borrow().is_empty());
    }

    #[test]
    fn test_missing_metadata_is_skipped_but_siblings_submit() {
        let gateway = MockGateway::default();
        let group = vec![
            command_diff(".packmind/commands/a.md", "A", Some(("art-a", "spc-1"))),
            command_diff(".cursor/commands/packmind/a.md", "A", None),
        ];

        let outcome = submit_diffs(&gateway, &[group], "").unwrap();

        assert_eq!(outcome.submitted, 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason, MISSING_METADATA);
        assert_eq!(gateway.submitted.borrow()[0].1.len(), 1);
    }

    #[test]
    fn test_batch_errors_map_to_artifact_names() {
        let gateway = MockGateway::default();
        gateway.queue_submit(BatchSubmitResponse {
            created: 1,
            skipped: 0,
            errors: vec![BatchError {
                index: 1,
                message: "Payload mismatch".to_string(),
                code: Some("ChangeProposalPayloadMismatchError".to_string()),
            }],
        });

        let group = vec![
            command_diff(".packmind/commands/a.md", "A", Some(("art-a", "spc-1"))),
            command_diff(".packmind/commands/b.md", "B", Some(("art-b", "spc-1"))),
        ];
        let outcome = submit_diffs(&gateway, &[group], "").unwrap();

        assert_eq!(outcome.submitted, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].name, "B");
        assert!(outcome.errors[0].is_payload_mismatch());
    }

    #[test]
    fn test_already_submitted_counted_separately() {
        let gateway = MockGateway::default();
        gateway.queue_submit(BatchSubmitResponse {
            created: 1,
            skipped: 1,
            errors: vec![],
        });

        let group = vec![
            command_diff(".packmind/commands/a.md", "A", Some(("art-a", "spc-1"))),
            command_diff(".packmind/commands/b.md", "B", Some(("art-b", "spc-1"))),
        ];
        let outcome = submit_diffs(&gateway, &[group], "").unwrap();

        assert_eq!(outcome.submitted, 1);
        assert_eq!(outcome.already_submitted, 1);
    }

    #[test]
    fn test_check_skips_invalid_diffs_without_network_call() {
        let gateway = MockGateway::default();
        let group = vec![command_diff(".packmind/commands/a.md", "A", None)];

        let results = check_diffs(&gateway, &[group]).unwrap();

        assert_eq!(results.len(), 1);
        assert!(!results[0].exists);
        assert!(results[0].created_at.is_none());
        assert!(gateway.checked.borrow().is_empty());
    }

    #[test]
    fn test_check_maps_existence_by_index() {
        let gateway = MockGateway::default();
        gateway.queue_check(vec![
            ProposalExistence {
                index: 0,
                exists: true,
                created_at: Some("2026-01-01T00:00:00Z".to_string()),
            },
            ProposalExistence {
                index: 1,
                exists: false,
                created_at: None,
            },
        ]);

        let group = vec![
            command_diff(".packmind/commands/a.md", "A", Some(("art-a", "spc-1"))),
            command_diff(".packmind/commands/b.md", "B", Some(("art-b", "spc-1"))),
        ];
        let results = check_diffs(&gateway, &[group]).unwrap();

        assert!(results[0].exists);
        assert_eq!(
            results[0].created_at.as_deref(),
            Some("2026-01-01T00:00:00Z")
        );
        assert!(!results[1].exists);
    }

    #[test]
    fn test_standard_diffs_are_checked_for_existence() {
        let gateway = MockGateway::default();
        gateway.queue_check(vec![ProposalExistence {
            index: 0,
            exists: true,
            created_at: Some("2026-02-01T00:00:00Z".to_string()),
        }]);
        let mut standard =
            command_diff(".packmind/standards/s.md", "My Standard", Some(("art-s", "spc-1")));
        standard.artifact_type = ArtifactType::Standard;

        let results = check_diffs(&gateway, &[vec![standard]]).unwrap();

        assert!(results[0].exists);
        assert_eq!(
            results[0].created_at.as_deref(),
            Some("2026-02-01T00:00:00Z")
        );
        assert_eq!(gateway.checked.borrow().len(), 1);
    }

    #[test]
    fn test_mixed_space_group_submits_one_batch_per_space() {
        let gateway = MockGateway::default();
        let group = vec![
            command_diff(".packmind/commands/a.md", "A", Some(("art-a", "spc-1"))),
            command_diff(".packmind/commands/b.md", "B", Some(("art-b", "spc-2"))),
        ];

        let outcome = submit_diffs(&gateway, &[group], "").unwrap();

        assert_eq!(outcome.submitted, 2);
        let submitted = gateway.submitted.borrow();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0].0, "spc-1");
        assert_eq!(submitted[1].0, "spc-2");
        assert_eq!(submitted[0].1.len(), 1);
        assert_eq!(submitted[1].1.len(), 1);
    }

    #[test]
    fn test_mixed_space_group_checks_each_space() {
        let gateway = MockGateway::default();
        gateway.queue_check(vec![ProposalExistence {
            index: 0,
            exists: false,
            created_at: None,
        }]);
        gateway.queue_check(vec![ProposalExistence {
            index: 0,
            exists: true,
            created_at: Some("2026-01-01T00:00:00Z".to_string()),
        }]);

        let group = vec![
            command_diff(".packmind/commands/a.md", "A", Some(("art-a", "spc-1"))),
            command_diff(".packmind/commands/b.md", "B", Some(("art-b", "spc-2"))),
        ];
        let results = check_diffs(&gateway, &[group]).unwrap();

        let checked = gateway.checked.borrow();
        assert_eq!(checked.len(), 2);
        assert_eq!(checked[0].0, "spc-1");
        assert_eq!(checked[1].0, "spc-2");
        assert!(!results[0].exists);
        assert!(results[1].exists);
    }

    #[test]
    fn test_check_sends_empty_message() {
        let gateway = MockGateway::default();
        let group = vec![command_diff(
            ".packmind/commands/a.md",
            "A",
            Some(("art-a", "spc-1")),
        )];

        check_diffs(&gateway, &[group]).unwrap();

        let checked = gateway.checked.borrow();
        assert_eq!(checked[0].1[0].message, "");
    }
}
