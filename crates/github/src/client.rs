use async_trait::async_trait;
use jsonwebtoken::EncodingKey;
use octocrab::models::{AppId, InstallationId as GithubInstallationId};
use octocrab::Octocrab;
use serde_json::{json, Value};
use tracing::debug;

use triage::{
    IssueNumber, IssueTarget, IssueTracker, LabelName, RepositoryId, TrackerError, TriageError,
};

/// How the client authenticates against the GitHub REST API.
#[derive(Clone, PartialEq, Eq)]
pub enum GithubAuth {
    /// A fixed personal access token; every repository is reached with it.
    Token(String),
    /// A GitHub App. Each call authenticates as the installation that
    /// delivered the event.
    App {
        app_id: u64,
        /// PEM-encoded RSA private key of the app.
        private_key: String,
    },
}

impl std::fmt::Debug for GithubAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GithubAuth::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            GithubAuth::App { app_id, .. } => f
                .debug_struct("App")
                .field("app_id", app_id)
                .field("private_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Credentials and endpoint for the GitHub REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    pub auth: GithubAuth,
    /// API base URI for GitHub Enterprise; `None` targets api.github.com.
    pub api_base: Option<String>,
}

/// [`IssueTracker`] backed by an authenticated octocrab client.
#[derive(Clone)]
pub struct GithubClient {
    octocrab: Octocrab,
    per_installation: bool,
}

impl GithubClient {
    /// Builds an authenticated client from `config`.
    pub fn from_config(config: &GithubConfig) -> Result<Self, TriageError> {
        let builder = Octocrab::builder();
        let (builder, per_installation) = match &config.auth {
            GithubAuth::Token(token) => (builder.personal_token(token.clone()), false),
            GithubAuth::App {
                app_id,
                private_key,
            } => {
                let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
                    .map_err(|err| config_error(format!("invalid GitHub App private key: {err}")))?;
                (builder.app(AppId::from(*app_id), key), true)
            }
        };
        let builder = match &config.api_base {
            Some(base) => builder
                .base_uri(base.clone())
                .map_err(|err| config_error(format!("invalid GitHub API URI '{base}': {err}")))?,
            None => builder,
        };
        let octocrab = builder
            .build()
            .map_err(|err| config_error(format!("failed to build GitHub client: {err}")))?;
        Ok(Self {
            octocrab,
            per_installation,
        })
    }

    /// Wraps a client whose credentials are used as-is for every call.
    pub fn from_octocrab(octocrab: Octocrab) -> Self {
        Self {
            octocrab,
            per_installation: false,
        }
    }

    /// Client to use for `target`.
    ///
    /// App clients switch to the target's installation; a delivery without an
    /// installation cannot be served in that mode.
    fn client_for(
        &self,
        operation: &'static str,
        target: &IssueTarget,
    ) -> Result<Octocrab, TrackerError> {
        if !self.per_installation {
            return Ok(self.octocrab.clone());
        }
        let installation = target.installation.ok_or_else(|| TrackerError::Api {
            operation,
            message: format!("delivery for {target} carries no installation id"),
        })?;
        self.octocrab
            .installation(GithubInstallationId::from(installation.as_u64()))
            .map_err(|err| TrackerError::Api {
                operation,
                message: err.to_string(),
            })
    }

    async fn post(
        &self,
        operation: &'static str,
        target: &IssueTarget,
        route: String,
        payload: Value,
    ) -> Result<(), TrackerError> {
        let _: Value = self
            .client_for(operation, target)?
            .post(route, Some(&payload))
            .await
            .map_err(|err| TrackerError::Api {
                operation,
                message: err.to_string(),
            })?;
        Ok(())
    }
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("per_installation", &self.per_installation)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IssueTracker for GithubClient {
    async fn post_comment(&self, target: &IssueTarget, body: &str) -> Result<(), TrackerError> {
        let route = comments_route(&target.repository, target.issue);
        self.post("post_comment", target, route, comment_payload(body))
            .await?;
        debug!(issue = %target, "Posted comment");
        Ok(())
    }

    async fn add_labels(
        &self,
        target: &IssueTarget,
        labels: &[LabelName],
    ) -> Result<(), TrackerError> {
        let route = labels_route(&target.repository, target.issue);
        self.post("add_labels", target, route, labels_payload(labels))
            .await?;
        debug!(issue = %target, count = labels.len(), "Added labels");
        Ok(())
    }
}

fn config_error(message: String) -> TriageError {
    TriageError::ConfigurationError { message }
}

fn comments_route(repository: &RepositoryId, issue: IssueNumber) -> String {
    format!(
        "/repos/{}/{}/issues/{issue}/comments",
        repository.owner(),
        repository.name()
    )
}

fn labels_route(repository: &RepositoryId, issue: IssueNumber) -> String {
    format!(
        "/repos/{}/{}/issues/{issue}/labels",
        repository.owner(),
        repository.name()
    )
}

fn comment_payload(body: &str) -> Value {
    json!({ "body": body })
}

fn labels_payload(labels: &[LabelName]) -> Value {
    json!({ "labels": labels.iter().map(LabelName::as_str).collect::<Vec<_>>() })
}
