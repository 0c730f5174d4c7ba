//! Value types for the triage domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! invariants (a [`LabelSet`] never holds a label twice, the artifact table is
//! read-only after construction) and participate in label derivation.

use std::collections::HashMap;

use serde::Serialize;

use crate::{InstallationId, IssueNumber, LabelName, RepositoryId};

// ---------------------------------------------------------------------------
// Issue events
// ---------------------------------------------------------------------------

/// The `action` of an `issues` webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueAction {
    /// The issue was created.
    Opened,
    /// The issue title or body was changed.
    Edited,
    /// Any other action (`closed`, `labeled`, ...), kept verbatim for logging.
    Other(String),
}

impl IssueAction {
    /// Maps a raw webhook action onto an [`IssueAction`].
    pub fn parse(action: &str) -> Self {
        match action {
            "opened" => Self::Opened,
            "edited" => Self::Edited,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns `true` when a welcome comment is due.
    pub fn posts_welcome(&self) -> bool {
        matches!(self, Self::Opened)
    }

    /// Returns `true` when the labeling rules should run.
    pub fn triggers_labeling(&self) -> bool {
        matches!(self, Self::Opened | Self::Edited)
    }

    /// Returns the action as it appears in the webhook payload.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Edited => "edited",
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for IssueAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// One `issues` webhook delivery, reduced to what triage needs.
///
/// Constructed fresh per delivery and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueEvent {
    /// Repository the issue belongs to.
    pub repository: RepositoryId,
    /// Issue number within the repository.
    pub issue: IssueNumber,
    /// What happened to the issue.
    pub action: IssueAction,
    /// Issue title.
    pub title: String,
    /// Issue body; empty when GitHub sent `null`.
    pub body: String,
    /// App installation that delivered the event; absent for plain repository webhooks.
    pub installation: Option<InstallationId>,
}

impl IssueEvent {
    /// Creates an event, normalising a missing body to the empty string.
    pub fn new(
        repository: RepositoryId,
        issue: IssueNumber,
        action: IssueAction,
        title: impl Into<String>,
        body: Option<String>,
    ) -> Self {
        Self {
            repository,
            issue,
            action,
            title: title.into(),
            body: body.unwrap_or_default(),
            installation: None,
        }
    }

    #[must_use]
    pub fn with_installation(mut self, installation: InstallationId) -> Self {
        self.installation = Some(installation);
        self
    }

    /// The issue the tracker acts on for this event.
    pub fn target(&self) -> IssueTarget {
        IssueTarget {
            repository: self.repository.clone(),
            issue: self.issue,
            installation: self.installation,
        }
    }
}

/// Addresses one issue for an [`IssueTracker`](crate::IssueTracker) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueTarget {
    pub repository: RepositoryId,
    pub issue: IssueNumber,
    /// Installation to authenticate as when running as a GitHub App.
    pub installation: Option<InstallationId>,
}

impl std::fmt::Display for IssueTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.repository, self.issue)
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Ordered set of labels; insertion order reflects the rule that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<LabelName>);

impl LabelSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `label` unless already present. Returns `true` if it was added.
    pub fn insert(&mut self, label: LabelName) -> bool {
        if self.contains(label.as_str()) {
            false
        } else {
            self.0.push(label);
            true
        }
    }

    /// Returns `true` if a label with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|l| l.as_str() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabelName> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[LabelName] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a LabelName;
    type IntoIter = std::slice::Iter<'a, LabelName>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------

/// Read-only mapping from a published SDK artifact id to the label it implies.
///
/// Built once at start-up and shared by reference between invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLabelTable {
    entries: HashMap<String, LabelName>,
}

impl ArtifactLabelTable {
    /// Creates a table from explicit `(artifact id, label)` pairs.
    pub fn new(entries: impl IntoIterator<Item = (String, LabelName)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// The table of known SDK packages.
    pub fn default_table() -> Self {
        const ENTRIES: [(&str, &str); 5] = [
            ("azure-core", "azure-core"),
            ("azure-resourcemanager-resources", "mgmt-resources"),
            ("azure-resourcemanager-storage", "mgmt-storage"),
            ("azure-resourcemanager-compute", "mgmt-compute"),
            ("azure-resourcemanager-network", "mgmt-network"),
        ];
        Self::new(
            ENTRIES
                .into_iter()
                .map(|(artifact, label)| (artifact.to_owned(), LabelName::from_static(label))),
        )
    }

    /// Returns the label for `artifact_id`, if the artifact is known.
    pub fn lookup(&self, artifact_id: &str) -> Option<&LabelName> {
        self.entries.get(artifact_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ArtifactLabelTable {
    fn default() -> Self {
        Self::default_table()
    }
}

// ---------------------------------------------------------------------------
// Key phrases
// ---------------------------------------------------------------------------

/// Key phrases returned by the text-analytics service for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPhraseResult {
    phrases: Vec<String>,
}

impl KeyPhraseResult {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// What the caller should do for one event.
///
/// The two fields are independent; neither gates the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelDecision {
    /// Whether to post the welcome comment.
    pub post_welcome: bool,
    /// Labels to apply; the caller skips the API call when empty.
    pub labels: LabelSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str) -> LabelName {
        LabelName::new(name).unwrap()
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(IssueAction::parse("opened"), IssueAction::Opened);
        assert_eq!(IssueAction::parse("edited"), IssueAction::Edited);
        assert_eq!(
            IssueAction::parse("closed"),
            IssueAction::Other("closed".to_owned())
        );
        assert_eq!(IssueAction::parse("closed").to_string(), "closed");
    }

    #[test]
    fn test_action_gates() {
        assert!(IssueAction::Opened.posts_welcome());
        assert!(!IssueAction::Edited.posts_welcome());
        assert!(IssueAction::Opened.triggers_labeling());
        assert!(IssueAction::Edited.triggers_labeling());
        assert!(!IssueAction::parse("reopened").triggers_labeling());
    }

    #[test]
    fn test_event_normalises_null_body() {
        let event = IssueEvent::new(
            RepositoryId::parse("o/r").unwrap(),
            IssueNumber::new(1),
            IssueAction::Opened,
            "title",
            None,
        );
        assert_eq!(event.body, "");
        assert_eq!(event.installation, None);
    }

    #[test]
    fn test_event_target_carries_installation() {
        let event = IssueEvent::new(
            RepositoryId::parse("o/r").unwrap(),
            IssueNumber::new(8),
            IssueAction::Edited,
            "title",
            None,
        )
        .with_installation(InstallationId::new(4242));

        let target = event.target();
        assert_eq!(target.installation, Some(InstallationId::new(4242)));
        assert_eq!(target.to_string(), "o/r#8");
    }

    #[test]
    fn test_label_set_keeps_insertion_order_without_duplicates() {
        let mut set = LabelSet::new();
        assert!(set.insert(label("bug")));
        assert!(set.insert(label("mgmt-storage")));
        assert!(set.insert(label("mgmt")));
        assert!(!set.insert(label("bug")));
        assert!(!set.insert(label("mgmt")));

        let names: Vec<&str> = set.iter().map(LabelName::as_str).collect();
        assert_eq!(names, ["bug", "mgmt-storage", "mgmt"]);
    }

    #[test]
    fn test_label_set_serialises_as_array() {
        let mut set = LabelSet::new();
        set.insert(label("bug"));
        set.insert(label("mgmt"));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["bug","mgmt"]"#);
    }

    #[test]
    fn test_default_table_entries() {
        let table = ArtifactLabelTable::default_table();
        assert_eq!(table.len(), 5);
        assert_eq!(table.lookup("azure-core").unwrap().as_str(), "azure-core");
        assert_eq!(
            table
                .lookup("azure-resourcemanager-network")
                .unwrap()
                .as_str(),
            "mgmt-network"
        );
        assert!(table.lookup("azure-identity").is_none());
        assert!(table.lookup("Azure-Core").is_none());
    }
}
