//! GitHub infrastructure adapter.
//!
//! Implements the [`triage::IssueTracker`] trait using
//! [`octocrab`](https://github.com/XAMPPRocky/octocrab): posting the welcome
//! comment and adding labels to an issue.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! Authentication, API base URI selection, and error mapping are handled
//! here; the [`triage`] crate never sees them.
//!
//! Requests go through octocrab's raw `post` so the payloads stay exactly the
//! documented REST shapes (`{"body": ...}` and `{"labels": [...]}`).

mod client;

pub use client::{GithubAuth, GithubClient, GithubConfig};
