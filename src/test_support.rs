//! Shared test doubles and fixtures

use std::cell::RefCell;
use std::path::Path;

use crate::error::{PackmindError, Result};
use crate::gateway::{
    BatchSubmitResponse, DeploymentReceipt, DistributionReport, PackageDetails, PackageSummary,
    ProposalExistence, ProposalRequest, PullRequest, PullResponse, RemoteGateway,
};

/// Distribution report captured by [`MockGateway::notify_distribution`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNotification {
    pub distributed_packages: Vec<String>,
    pub git_remote_url: String,
    pub git_branch: String,
    pub relative_path: String,
}

/// In-memory gateway recording every call
///
/// Queued responses are consumed front-to-back; an empty queue yields an
/// empty/default response so simple tests need no setup.
#[derive(Default)]
pub struct MockGateway {
    pub pull_response: PullResponse,
    pub packages: Vec<PackageSummary>,
    pub details: Vec<PackageDetails>,
    pub check_responses: RefCell<Vec<Vec<ProposalExistence>>>,
    pub submit_responses: RefCell<Vec<BatchSubmitResponse>>,
    pub pull_failures: RefCell<usize>,
    pub pulls: RefCell<Vec<PullRequest>>,
    pub checked: RefCell<Vec<(String, Vec<ProposalRequest>)>>,
    pub submitted: RefCell<Vec<(String, Vec<ProposalRequest>)>>,
    pub notifications: RefCell<Vec<RecordedNotification>>,
}

impl MockGateway {
    pub fn with_pull(pull_response: PullResponse) -> Self {
        MockGateway {
            pull_response,
            ..Default::default()
        }
    }

    /// Make the next pull fail with an API error
    pub fn fail_next_pull(&self) {
        *self.pull_failures.borrow_mut() += 1;
    }

    pub fn queue_check(&self, results: Vec<ProposalExistence>) {
        self.check_responses.borrow_mut().push(results);
    }

    pub fn queue_submit(&self, response: BatchSubmitResponse) {
        self.submit_responses.borrow_mut().push(response);
    }
}

impl RemoteGateway for MockGateway {
    fn pull(&self, request: &PullRequest) -> Result<PullResponse> {
        self.pulls.borrow_mut().push(request.clone());
        let mut failures = self.pull_failures.borrow_mut();
        if *failures > 0 {
            *failures -= 1;
            return Err(PackmindError::ApiRequestFailed {
                message: "simulated pull failure".to_string(),
            });
        }
        Ok(self.pull_response.clone())
    }

    fn list_packages(&self) -> Result<Vec<PackageSummary>> {
        Ok(self.packages.clone())
    }

    fn package_details(&self, slug: &str) -> Result<PackageDetails> {
        self.details
            .iter()
            .find(|details| details.slug == slug)
            .cloned()
            .ok_or_else(|| PackmindError::NotFound {
                message: format!("Package '{slug}' not found"),
            })
    }

    fn notify_distribution(&self, report: &DistributionReport<'_>) -> Result<DeploymentReceipt> {
        self.notifications.borrow_mut().push(RecordedNotification {
            distributed_packages: report.distributed_packages.to_vec(),
            git_remote_url: report.git_remote_url.to_string(),
            git_branch: report.git_branch.to_string(),
            relative_path: report.relative_path.to_string(),
        });
        Ok(DeploymentReceipt {
            deployment_id: Some("deployment-1".to_string()),
        })
    }

    fn check_proposals(
        &self,
        space_id: &str,
        proposals: &[ProposalRequest],
    ) -> Result<Vec<ProposalExistence>> {
        self.checked
            .borrow_mut()
            .push((space_id.to_string(), proposals.to_vec()));
        let mut queued = self.check_responses.borrow_mut();
        if queued.is_empty() {
            Ok(proposals
                .iter()
                .enumerate()
                .map(|(index, _)| ProposalExistence {
                    index,
                    exists: false,
                    created_at: None,
                })
                .collect())
        } else {
            Ok(queued.remove(0))
        }
    }

    fn submit_proposals(
        &self,
        space_id: &str,
        proposals: &[ProposalRequest],
    ) -> Result<BatchSubmitResponse> {
        self.submitted
            .borrow_mut()
            .push((space_id.to_string(), proposals.to_vec()));
        let mut queued = self.submit_responses.borrow_mut();
        if queued.is_empty() {
            Ok(BatchSubmitResponse {
                created: proposals.len(),
                skipped: 0,
                errors: vec![],
            })
        } else {
            Ok(queued.remove(0))
        }
    }
}

/// Initialize a git repository with an origin remote and one commit
pub fn init_git_repo(directory: &Path) {
    let repo = git2::Repository::init(directory).unwrap();
    repo.remote("origin", "git@github.com:acme/monorepo.git")
        .unwrap();

    let mut index = repo.index().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = git2::Signature::now("test", "test@example.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
        .unwrap();
}
