//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`LabelName`] with a [`DeliveryId`] even though both are strings under the
//! hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TriageError;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (GitHub-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// The per-repository number of a GitHub issue (the `#42` in the UI).
    IssueNumber
}

u64_id! {
    /// A GitHub App installation, taken from the `installation.id` of a delivery.
    InstallationId
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single triage invocation (one processed webhook delivery).
///
/// Generated fresh for every handled event; propagated through spans so all
/// activity from a single invocation can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriageRunId(Uuid);

impl TriageRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TriageRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// A label name applied to an issue (e.g. `"bug"`, `"mgmt-storage"`).
    LabelName
}

/// Prefix shared by every management-plane SDK label.
const MANAGEMENT_PREFIX: &str = "mgmt-";

impl LabelName {
    /// Creates a label from a non-empty literal known at compile time.
    pub(crate) fn from_static(value: &'static str) -> Self {
        debug_assert!(!value.is_empty());
        Self(value.to_owned())
    }

    /// Returns `true` for labels naming a management-plane package (`mgmt-*`).
    pub fn is_management_scoped(&self) -> bool {
        self.0.starts_with(MANAGEMENT_PREFIX)
    }
}

string_id! {
    /// The `X-GitHub-Delivery` GUID identifying one webhook delivery.
    DeliveryId
}

string_id! {
    /// Identifies a document submitted to the key-phrase extraction service.
    ///
    /// Unique per request; only used to match the response to the request.
    DocumentId
}

impl DocumentId {
    /// Creates an id from a Unix timestamp in milliseconds.
    pub fn from_timestamp_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }
}

// ---------------------------------------------------------------------------

/// Identifies a GitHub repository in `"owner/repo"` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryId {
    owner: String,
    name: String,
}

impl RepositoryId {
    /// Creates a repository identifier from its two components.
    ///
    /// Returns `None` if either component is empty or contains a `/`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Option<Self> {
        let owner = owner.into();
        let name = name.into();
        let valid = |s: &str| !s.is_empty() && !s.contains('/');
        if valid(&owner) && valid(&name) {
            Some(Self { owner, name })
        } else {
            None
        }
    }

    /// Parses a `"owner/repo"` full name as found in webhook payloads.
    pub fn parse(full_name: &str) -> Result<Self, TriageError> {
        full_name
            .split_once('/')
            .and_then(|(owner, name)| Self::new(owner, name))
            .ok_or_else(|| TriageError::InvalidRepository {
                value: full_name.to_owned(),
            })
    }

    /// Returns the owning user or organisation.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name without the owner.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl TryFrom<String> for RepositoryId {
    type Error = TriageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RepositoryId> for String {
    fn from(value: RepositoryId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_id_rejects_empty() {
        assert!(LabelName::new("").is_none());
        assert_eq!(LabelName::new("bug").unwrap().as_str(), "bug");
    }

    #[test]
    fn test_label_management_scope() {
        assert!(LabelName::from_static("mgmt-storage").is_management_scoped());
        assert!(!LabelName::from_static("mgmt").is_management_scoped());
        assert!(!LabelName::from_static("azure-core").is_management_scoped());
    }

    #[test]
    fn test_repository_parse() {
        let repo = RepositoryId::parse("Azure/azure-sdk-for-java").unwrap();
        assert_eq!(repo.owner(), "Azure");
        assert_eq!(repo.name(), "azure-sdk-for-java");
        assert_eq!(repo.to_string(), "Azure/azure-sdk-for-java");
    }

    #[test]
    fn test_repository_parse_rejects_malformed() {
        for value in ["", "owner", "/repo", "owner/", "a/b/c"] {
            assert!(RepositoryId::parse(value).is_err(), "accepted {value:?}");
        }
    }

    #[test]
    fn test_repository_serde_as_string() {
        let repo = RepositoryId::parse("octo/cat").unwrap();
        let json = serde_json::to_string(&repo).unwrap();
        assert_eq!(json, "\"octo/cat\"");
        let back: RepositoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, repo);
        assert!(serde_json::from_str::<RepositoryId>("\"nope\"").is_err());
    }

    #[test]
    fn test_triage_run_ids_are_unique() {
        assert_ne!(TriageRunId::new_random(), TriageRunId::new_random());
    }
}
