//! HTTP implementation of the remote gateway
//!
//! One blocking `ureq` agent per process. Transport failures (refused
//! connection, DNS) map to `ServerUnreachable`; HTTP 400 and 404 map to
//! their own variants so callers can give targeted help.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::ApiCredentials;
use crate::error::{PackmindError, Result};
use crate::gateway::{
    BatchSubmitResponse, CheckProposalsResponse, DeploymentReceipt, DistributionReport,
    ListPackagesResponse, PackageDetails, PackageSummary, ProposalExistence, ProposalRequest,
    PullRequest, PullResponse, RemoteGateway,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpGateway {
    agent: ureq::Agent,
    credentials: ApiCredentials,
}

impl HttpGateway {
    pub fn new(credentials: ApiCredentials) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build();
        HttpGateway { agent, credentials }
    }

    /// Full URL for an organization-scoped API path
    fn url(&self, path: &str) -> String {
        format!(
            "{}/api/v0/organizations/{}{}",
            self.credentials.host, self.credentials.organization_id, path
        )
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let mut request = self
            .agent
            .get(url)
            .set("Authorization", &format!("Bearer {}", self.credentials.api_key))
            .set("Content-Type", "application/json");
        for (name, value) in query {
            request = request.query(name, value);
        }

        let response = request.call().map_err(|err| self.map_error(err))?;
        response
            .into_json()
            .map_err(|err| PackmindError::ApiRequestFailed {
                message: format!("invalid response body: {err}"),
            })
    }

    fn post_json<T: DeserializeOwned>(&self, url: &str, body: &Value) -> Result<T> {
        let response = self
            .agent
            .post(url)
            .set("Authorization", &format!("Bearer {}", self.credentials.api_key))
            .send_json(body.clone())
            .map_err(|err| self.map_error(err))?;
        response
            .into_json()
            .map_err(|err| PackmindError::ApiRequestFailed {
                message: format!("invalid response body: {err}"),
            })
    }

    fn map_error(&self, err: ureq::Error) -> PackmindError {
        match err {
            ureq::Error::Status(status, response) => {
                let message = response
                    .into_json::<Value>()
                    .ok()
                    .and_then(|body| {
                        body.get("message")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| format!("API request failed: {status}"));
                match status {
                    400 => PackmindError::Validation { message },
                    404 => PackmindError::NotFound { message },
                    _ => PackmindError::ApiRequestFailed { message },
                }
            }
            ureq::Error::Transport(_) => PackmindError::ServerUnreachable {
                host: self.credentials.host.clone(),
            },
        }
    }
}

impl RemoteGateway for HttpGateway {
    fn pull(&self, request: &PullRequest) -> Result<PullResponse> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        for slug in &request.package_slugs {
            query.push(("packageSlug", slug));
        }
        for slug in &request.previous_package_slugs {
            query.push(("previousPackageSlug", slug));
        }
        if let Some(agents) = &request.agents {
            for agent in agents {
                query.push(("agent", agent));
            }
        }
        if let Some(git) = &request.git {
            query.push(("gitRemoteUrl", &git.git_remote_url));
            query.push(("gitBranch", &git.git_branch));
            query.push(("relativePath", &git.relative_path));
        }

        self.get_json(&self.url("/pull"), &query)
    }

    fn list_packages(&self) -> Result<Vec<PackageSummary>> {
        let response: ListPackagesResponse = self.get_json(&self.url("/packages"), &[])?;
        Ok(response.packages)
    }

    fn package_details(&self, slug: &str) -> Result<PackageDetails> {
        self.get_json(&self.url(&format!("/packages/{slug}")), &[])
    }

    fn notify_distribution(&self, report: &DistributionReport<'_>) -> Result<DeploymentReceipt> {
        let body = serde_json::to_value(report).map_err(|err| PackmindError::ApiRequestFailed {
            message: format!("cannot serialize notification: {err}"),
        })?;
        self.post_json(&self.url("/deployments"), &body)
    }

    fn check_proposals(
        &self,
        space_id: &str,
        proposals: &[ProposalRequest],
    ) -> Result<Vec<ProposalExistence>> {
        let body = serde_json::json!({ "proposals": proposals });
        let response: CheckProposalsResponse = self.post_json(
            &self.url(&format!("/spaces/{space_id}/change-proposals/check")),
            &body,
        )?;
        Ok(response.results)
    }

    fn submit_proposals(
        &self,
        space_id: &str,
        proposals: &[ProposalRequest],
    ) -> Result<BatchSubmitResponse> {
        let body = serde_json::json!({ "proposals": proposals });
        self.post_json(
            &self.url(&format!("/spaces/{space_id}/change-proposals/batch")),
            &body,
        )
    }
}
