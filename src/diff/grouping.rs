//! Diff grouping and deduplication
//!
//! Diffs group by logical artifact for reporting and submission. Inside a
//! group, identical changes rendered into several agent-specific files
//! collapse into one sub-group so a single edit is shown (and submitted)
//! once.

use std::collections::HashMap;

use crate::domain::ArtefactDiff;

/// Group diffs by `(artifact_type, artifact_name)`, preserving first-seen
/// order of both groups and members
pub fn group_by_artifact(diffs: &[ArtefactDiff]) -> Vec<Vec<ArtefactDiff>> {
    group_by(diffs, |diff| {
        format!("{:?}:{}", diff.artifact_type, diff.artifact_name)
    })
}

/// Split one artifact group by serialized change content
///
/// Members of a sub-group are the same semantic change at different file
/// paths.
pub fn sub_group_by_change(diffs: &[ArtefactDiff]) -> Vec<Vec<ArtefactDiff>> {
    group_by(diffs, |diff| diff.change.dedup_key())
}

fn group_by<F: Fn(&ArtefactDiff) -> String>(
    diffs: &[ArtefactDiff],
    key_of: F,
) -> Vec<Vec<ArtefactDiff>> {
    let mut index_of: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<ArtefactDiff>> = Vec::new();

    for diff in diffs {
        let key = key_of(diff);
        match index_of.get(&key) {
            Some(&index) => groups[index].push(diff.clone()),
            None => {
                index_of.insert(key, groups.len());
                groups.push(vec![diff.clone()]);
            }
        }
    }

    groups
}
