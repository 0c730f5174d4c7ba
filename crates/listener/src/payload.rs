//! The subset of the `issues` webhook payload the triager reads.

use serde::Deserialize;

use triage::{InstallationId, IssueAction, IssueEvent, IssueNumber, RepositoryId, TriageError};

/// Body of an `issues` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuesPayload {
    pub action: String,
    pub issue: IssuePayload,
    pub repository: RepositoryPayload,
    /// Present when the delivery comes from a GitHub App installation.
    #[serde(default)]
    pub installation: Option<InstallationPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuePayload {
    pub number: u64,
    pub title: String,
    /// `null` when the issue was created without a description.
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallationPayload {
    pub id: u64,
}

impl IssuesPayload {
    /// Converts the payload into a domain event.
    pub fn into_event(self) -> Result<IssueEvent, TriageError> {
        let repository = RepositoryId::parse(&self.repository.full_name)?;
        let event = IssueEvent::new(
            repository,
            IssueNumber::new(self.issue.number),
            IssueAction::parse(&self.action),
            self.issue.title,
            self.issue.body,
        );
        Ok(match self.installation {
            Some(installation) => event.with_installation(InstallationId::new(installation.id)),
            None => event,
        })
    }
}
