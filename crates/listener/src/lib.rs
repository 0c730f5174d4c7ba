//! GitHub webhook receiver.
//!
//! Binds the HTTP routes GitHub delivers to and turns `issues` deliveries into
//! [`triage::IssueEvent`]s for the [`handler::IssueEventHandler`].
//!
//! ## Routes
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /webhook` | GitHub deliveries; HMAC-SHA256 verified |
//! | `GET /health` | Liveness probe |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details, signature verification, and payload
//! deserialization all live here. The [`triage`] crate sees only
//! [`triage::IssueEvent`].

pub mod payload;
pub mod signature;
pub mod webhook;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use handler::IssueEventHandler;

pub use payload::IssuesPayload;
pub use signature::{compute_signature, format_signature_header, verify_signature};
pub use webhook::{webhook_handler, WebhookError};

/// Largest accepted delivery body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state passed to every route via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    handler: IssueEventHandler,
    webhook_secret: Arc<[u8]>,
}

impl AppState {
    pub fn new(handler: IssueEventHandler, webhook_secret: impl Into<Vec<u8>>) -> Self {
        let secret: Vec<u8> = webhook_secret.into();
        Self {
            handler,
            webhook_secret: Arc::from(secret),
        }
    }

    pub fn handler(&self) -> &IssueEventHandler {
        &self.handler
    }

    /// Secret used to verify `X-Hub-Signature-256`.
    pub fn webhook_secret(&self) -> &[u8] {
        &self.webhook_secret
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Liveness probe.
pub async fn health_handler() -> &'static str {
    "OK"
}
