//! Error types for the triage domain and its ports.
//!
//! [`TriageError`] covers invalid domain input and configuration. The port
//! errors ([`KeyPhraseError`], [`TrackerError`]) are returned by infrastructure
//! adapters; none of them is fatal to the hosting process. The caller decides
//! which contribution to skip and carries on with the rest of the event.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

/// Errors produced while building domain values or loading configuration.
#[derive(Debug, Error)]
pub enum TriageError {
    /// A repository full name was not of the form `owner/repo`.
    #[error("Invalid repository name '{value}', expected 'owner/repo'")]
    InvalidRepository {
        /// The rejected value.
        value: String,
    },

    /// The runtime configuration is invalid.
    ///
    /// Produced at start-up; the listener never starts with an invalid config.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Port errors
// ---------------------------------------------------------------------------

/// Failures of the key-phrase extraction service.
///
/// The deriver treats every variant as "no key-phrase labels for this event".
#[derive(Debug, Error)]
pub enum KeyPhraseError {
    /// The request could not be sent or timed out.
    #[error("Key-phrase request failed: {message}")]
    Transport {
        /// Transport-level failure description.
        message: String,
    },

    /// The service answered with a status other than `200 OK`.
    #[error("Key-phrase service returned HTTP {status}")]
    UnexpectedStatus {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The response body did not contain key phrases for the submitted document.
    #[error("Key-phrase response could not be interpreted: {message}")]
    MalformedResponse {
        /// Description of what was missing or malformed.
        message: String,
    },
}

/// Failures of the issue tracker (comment and label mutations).
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The remote API rejected or failed the request.
    #[error("Issue tracker call '{operation}' failed: {message}")]
    Api {
        /// The operation that failed (e.g. `"post_comment"`).
        operation: &'static str,
        /// Error description reported by the client.
        message: String,
    },
}
