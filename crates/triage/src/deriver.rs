//! The label deriver: synchronous rules plus optional key-phrase enrichment.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::rules::{apply_key_phrases, derive_labels, is_key_phrase_eligible};
use crate::{ArtifactLabelTable, IssueEvent, KeyPhraseExtractor, LabelDecision};

/// Derives the [`LabelDecision`] for one issue event.
///
/// Holds only shared read-only state, so one deriver serves concurrent events.
#[derive(Clone)]
pub struct LabelDeriver {
    table: Arc<ArtifactLabelTable>,
    extractor: Option<Arc<dyn KeyPhraseExtractor>>,
}

impl LabelDeriver {
    /// Creates a deriver. Without an extractor the key-phrase step is skipped.
    pub fn new(
        table: Arc<ArtifactLabelTable>,
        extractor: Option<Arc<dyn KeyPhraseExtractor>>,
    ) -> Self {
        Self { table, extractor }
    }

    /// Runs every rule against `event`.
    ///
    /// A failing key-phrase call is logged and contributes no labels; labels
    /// from the title and body scan are kept.
    pub async fn derive(&self, event: &IssueEvent) -> LabelDecision {
        let mut decision = derive_labels(event, &self.table);
        if !event.action.triggers_labeling() {
            return decision;
        }

        let Some(extractor) = &self.extractor else {
            debug!("Key-phrase extraction not configured, skipping");
            return decision;
        };
        if !is_key_phrase_eligible(&event.body) {
            debug!(
                body_chars = event.body.chars().count(),
                "Body length outside key-phrase bounds, skipping"
            );
            return decision;
        }

        match extractor.extract_key_phrases(&event.body).await {
            Ok(result) => {
                info!(phrases = ?result.phrases(), "Key phrases found in issue body");
                apply_key_phrases(&result, &mut decision.labels);
            }
            Err(err) => {
                warn!(error = %err, "Key-phrase extraction failed, continuing without it");
            }
        }
        decision
    }
}

impl std::fmt::Debug for LabelDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelDeriver")
            .field("table_entries", &self.table.len())
            .field("key_phrases", &self.extractor.is_some())
            .finish()
    }
}
