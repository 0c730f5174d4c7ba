use std::sync::Arc;

use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};

use triage::{IssueEvent, IssueTracker, LabelDecision, LabelDeriver, TriageRunId, WELCOME_COMMENT};

/// What happened while handling one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandleOutcome {
    /// Correlation id of this invocation.
    pub run_id: TriageRunId,
    /// The derived decision.
    pub decision: LabelDecision,
    /// The welcome comment was posted successfully.
    pub commented: bool,
    /// The derived labels were applied successfully.
    pub labels_applied: bool,
    /// Description of each downstream call that failed.
    pub failures: Vec<String>,
}

/// Handles `issues` events: comment, then derive and label.
#[derive(Clone)]
pub struct IssueEventHandler {
    deriver: LabelDeriver,
    tracker: Arc<dyn IssueTracker>,
}

impl IssueEventHandler {
    pub fn new(deriver: LabelDeriver, tracker: Arc<dyn IssueTracker>) -> Self {
        Self { deriver, tracker }
    }

    /// Processes one event. Downstream failures are reported in the outcome.
    pub async fn handle(&self, event: &IssueEvent) -> HandleOutcome {
        let run_id = TriageRunId::new_random();
        let span = info_span!(
            "handle_issue_event",
            run_id = %run_id,
            repository = %event.repository,
            issue = %event.issue,
            action = %event.action,
        );
        self.handle_inner(run_id, event).instrument(span).await
    }

    async fn handle_inner(&self, run_id: TriageRunId, event: &IssueEvent) -> HandleOutcome {
        let target = event.target();
        let mut failures = Vec::new();

        // The welcome comment depends only on the action; post it before deriving.
        let mut commented = false;
        if event.action.posts_welcome() {
            match self.tracker.post_comment(&target, WELCOME_COMMENT).await {
                Ok(()) => commented = true,
                Err(err) => {
                    warn!(error = %err, "Failed to post welcome comment");
                    failures.push(err.to_string());
                }
            }
        }

        let decision = self.deriver.derive(event).await;
        let mut labels_applied = false;
        if !decision.labels.is_empty() {
            match self
                .tracker
                .add_labels(&target, decision.labels.as_slice())
                .await
            {
                Ok(()) => {
                    info!(labels = ?decision.labels, "Applied labels");
                    labels_applied = true;
                }
                Err(err) => {
                    warn!(error = %err, "Failed to apply labels");
                    failures.push(err.to_string());
                }
            }
        }

        HandleOutcome {
            run_id,
            decision,
            commented,
            labels_applied,
            failures,
        }
    }
}

impl std::fmt::Debug for IssueEventHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueEventHandler")
            .field("deriver", &self.deriver)
            .finish_non_exhaustive()
    }
}
