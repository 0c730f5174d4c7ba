//! Port traits implemented by infrastructure adapters.
//!
//! The domain only ever sees these traits. `text-analytics` implements
//! [`KeyPhraseExtractor`]; `github` implements [`IssueTracker`]. Tests use
//! in-memory fakes.

use async_trait::async_trait;

use crate::{IssueTarget, KeyPhraseError, KeyPhraseResult, LabelName, TrackerError};

/// Extracts salient key phrases from free text.
#[async_trait]
pub trait KeyPhraseExtractor: Send + Sync {
    /// Submits `text` as a single English document and returns its key phrases.
    async fn extract_key_phrases(&self, text: &str) -> Result<KeyPhraseResult, KeyPhraseError>;
}

/// Mutations the triager performs on an issue.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Posts a comment with `body` on the issue.
    async fn post_comment(&self, target: &IssueTarget, body: &str) -> Result<(), TrackerError>;

    /// Adds `labels` to the issue. Existing labels are left untouched.
    async fn add_labels(
        &self,
        target: &IssueTarget,
        labels: &[LabelName],
    ) -> Result<(), TrackerError>;
}
