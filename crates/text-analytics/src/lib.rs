//! Key-phrase extraction infrastructure adapter.
//!
//! Implements the [`triage::KeyPhraseExtractor`] trait against the text-analytics
//! REST API (`/text/analytics/v2.1/keyPhrases`). Each call submits the issue body
//! as a single English document and returns the phrases found for it.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, the subscription-key
//! header, the request timeout, and response parsing all live here. The
//! [`triage`] crate sees only [`triage::KeyPhraseExtractor`].
//!
//! ## Failure Semantics
//!
//! There is no retry. Transport failures and timeouts, non-200 responses, and
//! unparseable bodies are reported as [`triage::KeyPhraseError`]; the deriver
//! treats all of them as "no key-phrase labels" for the event.

mod client;
mod wire;

pub use client::{TextAnalyticsClient, TextAnalyticsConfig, KEY_PHRASES_PATH};
