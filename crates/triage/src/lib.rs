//! Core triage domain for the issue triager.
//!
//! This crate contains every domain concept, newtype identifier, value type,
//! and the label-derivation rules used to triage a GitHub issue. Infrastructure
//! crates implement the port traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`RepositoryId`, `IssueNumber`, `LabelName`, etc.) |
//! | [`types`] | Value types (`IssueEvent`, `LabelSet`, `ArtifactLabelTable`, etc.) |
//! | [`rules`] | Pure label rules: title markers, SDK-name extraction, key-phrase filter |
//! | [`deriver`] | [`LabelDeriver`], which combines the rules with the key-phrase service |
//! | [`ports`] | Traits implemented by infrastructure adapters |
//! | [`errors`] | Domain and port error types |

pub mod deriver;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod rules;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use deriver::LabelDeriver;
pub use errors::{KeyPhraseError, TrackerError, TriageError};
pub use identifiers::{
    DeliveryId, DocumentId, InstallationId, IssueNumber, LabelName, RepositoryId, TriageRunId,
};
pub use ports::{IssueTracker, KeyPhraseExtractor};
pub use rules::{derive_labels, WELCOME_COMMENT};
pub use types::{
    ArtifactLabelTable, IssueAction, IssueEvent, IssueTarget, KeyPhraseResult, LabelDecision,
    LabelSet,
};
