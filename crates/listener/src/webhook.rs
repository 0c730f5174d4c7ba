//! Webhook endpoint handler.
//!
//! Verifies the delivery signature, keeps only `issues` events, and hands the
//! parsed event to the [`handler::IssueEventHandler`]. Processing happens
//! inside the request so GitHub's delivery log shows the outcome.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{debug, info, warn};

use triage::{DeliveryId, TriageError};

use crate::{verify_signature, AppState, IssuesPayload};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

const ISSUES_EVENT: &str = "issues";

/// Errors that can occur when receiving a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Invalid signature.
    #[error("invalid signature")]
    InvalidSignature,

    /// Invalid JSON body.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Well-formed JSON that does not describe a valid issue event.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] TriageError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(HEADER_SIGNATURE) | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::MissingHeader(_)
            | WebhookError::InvalidJson(_)
            | WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Response
///
/// - 200 OK: `issues` event processed; body is the JSON outcome
/// - 202 Accepted: other event type, ignored
/// - 400 Bad Request: missing event header, invalid JSON or payload
/// - 401 Unauthorized: missing or invalid signature
pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    let delivery_id = headers
        .get(HEADER_DELIVERY)
        .and_then(|value| value.to_str().ok())
        .and_then(DeliveryId::new);

    let signature = get_header(&headers, HEADER_SIGNATURE)?;
    if !verify_signature(&body, signature, state.webhook_secret()) {
        warn!(delivery_id = ?delivery_id, "Invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    let event_type = get_header(&headers, HEADER_EVENT)?;
    if event_type != ISSUES_EVENT {
        debug!(delivery_id = ?delivery_id, event_type, "Ignoring event type");
        return Ok((StatusCode::ACCEPTED, "Ignored").into_response());
    }

    let payload: IssuesPayload = serde_json::from_slice(&body)?;
    let event = payload.into_event()?;
    info!(
        delivery_id = ?delivery_id,
        repository = %event.repository,
        issue = %event.issue,
        action = %event.action,
        "Received issues event"
    );

    let outcome = state.handler().handle(&event).await;
    Ok((StatusCode::OK, Json(outcome)).into_response())
}

fn get_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, WebhookError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or(WebhookError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use handler::IssueEventHandler;
    use triage::{
        ArtifactLabelTable, InstallationId, IssueTarget, IssueTracker, LabelDeriver, LabelName,
        TrackerError,
    };

    use super::*;
    use crate::{compute_signature, format_signature_header, router, MAX_BODY_BYTES};

    const SECRET: &[u8] = b"webhook-secret";

    #[derive(Default)]
    struct RecordingTracker {
        comments: Mutex<Vec<(String, u64, String)>>,
        labels: Mutex<Vec<Vec<String>>>,
        installations: Mutex<Vec<Option<InstallationId>>>,
    }

    #[async_trait]
    impl IssueTracker for RecordingTracker {
        async fn post_comment(&self, target: &IssueTarget, body: &str) -> Result<(), TrackerError> {
            self.installations.lock().unwrap().push(target.installation);
            self.comments.lock().unwrap().push((
                target.repository.to_string(),
                target.issue.as_u64(),
                body.to_owned(),
            ));
            Ok(())
        }

        async fn add_labels(
            &self,
            target: &IssueTarget,
            labels: &[LabelName],
        ) -> Result<(), TrackerError> {
            self.installations.lock().unwrap().push(target.installation);
            self.labels
                .lock()
                .unwrap()
                .push(labels.iter().map(|l| l.as_str().to_owned()).collect());
            Ok(())
        }
    }

    fn app(tracker: &Arc<RecordingTracker>) -> axum::Router {
        let deriver = LabelDeriver::new(Arc::new(ArtifactLabelTable::default_table()), None);
        let tracker: Arc<dyn IssueTracker> = tracker.clone();
        router(AppState::new(IssueEventHandler::new(deriver, tracker), SECRET))
    }

    fn issues_body(action: &str, title: &str, body: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "action": action,
            "issue": { "number": 99, "title": title, "body": body },
            "repository": { "full_name": "Azure/azure-sdk-for-java" }
        }))
        .unwrap()
    }

    fn signed_request(event: &str, body: Vec<u8>) -> Request<Body> {
        let signature = format_signature_header(&compute_signature(&body, SECRET));
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(HEADER_EVENT, event)
            .header(HEADER_DELIVERY, "72d3162e-cc78-11e3-81ab-4c9367dc0958")
            .header(HEADER_SIGNATURE, signature)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_opened_issue_is_commented_and_labeled() {
        let tracker = Arc::new(RecordingTracker::default());
        let body = issues_body(
            "opened",
            "[Bug] upload",
            json!("Library used: azure-resourcemanager-storage"),
        );

        let response = app(&tracker)
            .oneshot(signed_request("issues", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let outcome = json_body(response).await;
        assert_eq!(
            outcome["decision"]["labels"],
            json!(["bug", "mgmt-storage", "mgmt"])
        );
        assert_eq!(outcome["commented"], json!(true));
        assert_eq!(
            *tracker.comments.lock().unwrap(),
            vec![(
                "Azure/azure-sdk-for-java".to_owned(),
                99,
                "Thanks for opening this issue!".to_owned()
            )]
        );
        assert_eq!(tracker.labels.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_null_body_is_accepted() {
        let tracker = Arc::new(RecordingTracker::default());
        let response = app(&tracker)
            .oneshot(signed_request(
                "issues",
                issues_body("opened", "question", Value::Null),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(tracker.comments.lock().unwrap().len(), 1);
        assert!(tracker.labels.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_action_makes_no_calls() {
        let tracker = Arc::new(RecordingTracker::default());
        let response = app(&tracker)
            .oneshot(signed_request(
                "issues",
                issues_body("closed", "[Bug] x", json!("Library used: azure-core")),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(tracker.comments.lock().unwrap().is_empty());
        assert!(tracker.labels.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_event_types_are_ignored() {
        let tracker = Arc::new(RecordingTracker::default());
        let response = app(&tracker)
            .oneshot(signed_request("ping", br#"{"zen":"Keep it simple."}"#.to_vec()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(tracker.comments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_signature_is_unauthorized() {
        let tracker = Arc::new(RecordingTracker::default());
        let mut request = signed_request("issues", issues_body("opened", "t", json!("b")));
        request.headers_mut().insert(
            HEADER_SIGNATURE,
            format_signature_header(&compute_signature(b"other", SECRET))
                .parse()
                .unwrap(),
        );

        let response = app(&tracker).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(tracker.comments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_signature_is_unauthorized() {
        let tracker = Arc::new(RecordingTracker::default());
        let mut request = signed_request("issues", issues_body("opened", "t", json!("b")));
        request.headers_mut().remove(HEADER_SIGNATURE);

        let response = app(&tracker).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_event_header_is_bad_request() {
        let tracker = Arc::new(RecordingTracker::default());
        let mut request = signed_request("issues", issues_body("opened", "t", json!("b")));
        request.headers_mut().remove(HEADER_EVENT);

        let response = app(&tracker).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_bad_request() {
        let tracker = Arc::new(RecordingTracker::default());
        let response = app(&tracker)
            .oneshot(signed_request("issues", br#"{"action":"opened"}"#.to_vec()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_installation_id_reaches_tracker() {
        let tracker = Arc::new(RecordingTracker::default());
        let body = serde_json::to_vec(&json!({
            "action": "opened",
            "issue": { "number": 99, "title": "[Bug] upload", "body": null },
            "repository": { "full_name": "Azure/azure-sdk-for-java" },
            "installation": { "id": 31337 }
        }))
        .unwrap();

        let response = app(&tracker)
            .oneshot(signed_request("issues", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *tracker.installations.lock().unwrap(),
            vec![Some(InstallationId::new(31337)); 2]
        );
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let tracker = Arc::new(RecordingTracker::default());
        let response = app(&tracker)
            .oneshot(signed_request("issues", vec![b'a'; MAX_BODY_BYTES + 1]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(tracker.comments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health() {
        let tracker = Arc::new(RecordingTracker::default());
        let response = app(&tracker)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
