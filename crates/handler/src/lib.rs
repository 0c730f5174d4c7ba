//! Issue event orchestration.
//!
//! This crate provides [`IssueEventHandler`], which runs the
//! [`triage::LabelDeriver`] for one event and performs the resulting effects:
//! the welcome comment and the label application.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The handler sequences calls between business logic
//! in the [`triage`] crate and the [`triage::IssueTracker`] port. It contains no
//! labeling rules of its own.
//!
//! ## Failure Semantics
//!
//! A failed comment or label call is logged and recorded in the
//! [`HandleOutcome`]; it never aborts the other call and never surfaces as an
//! error to the webhook receiver.

mod event_handler;

pub use event_handler::{HandleOutcome, IssueEventHandler};
