use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{StatusCode, Url};
use tracing::{debug, debug_span, Instrument};

use triage::{DocumentId, KeyPhraseError, KeyPhraseExtractor, KeyPhraseResult, TriageError};

use crate::wire::{KeyPhraseRequest, KeyPhraseResponse, RequestDocument};

/// Absolute path of the key-phrase operation, resolved against the endpoint.
pub const KEY_PHRASES_PATH: &str = "/text/analytics/v2.1/keyPhrases";

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const DOCUMENT_LANGUAGE: &str = "en";

/// Connection settings for the text-analytics service.
#[derive(Clone, PartialEq, Eq)]
pub struct TextAnalyticsConfig {
    /// Base URL of the service, e.g. `https://<resource>.cognitiveservices.azure.com/`.
    pub endpoint: String,
    /// Value of the `Ocp-Apim-Subscription-Key` header.
    pub subscription_key: String,
    /// Upper bound on one request, connection included.
    pub timeout: Duration,
}

impl std::fmt::Debug for TextAnalyticsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAnalyticsConfig")
            .field("endpoint", &self.endpoint)
            .field("subscription_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TextAnalyticsConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a config with the default timeout.
    pub fn new(endpoint: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            subscription_key: subscription_key.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the key-phrase operation.
    ///
    /// The operation path is absolute, so any path on the endpoint is replaced.
    pub fn key_phrases_url(&self) -> Result<Url, TriageError> {
        Url::parse(&self.endpoint)
            .and_then(|base| base.join(KEY_PHRASES_PATH))
            .map_err(|err| TriageError::ConfigurationError {
                message: format!(
                    "invalid text-analytics endpoint '{}': {err}",
                    self.endpoint
                ),
            })
    }
}

/// HTTP client for the key-phrase operation.
#[derive(Clone)]
pub struct TextAnalyticsClient {
    http: reqwest::Client,
    url: Url,
    subscription_key: String,
}

impl TextAnalyticsClient {
    /// Builds a client; fails only on an unusable endpoint or TLS set-up.
    pub fn new(config: &TextAnalyticsConfig) -> Result<Self, TriageError> {
        let url = config.key_phrases_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| TriageError::ConfigurationError {
                message: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self {
            http,
            url,
            subscription_key: config.subscription_key.clone(),
        })
    }

    async fn request(
        &self,
        id: &DocumentId,
        text: &str,
    ) -> Result<KeyPhraseResult, KeyPhraseError> {
        let body = KeyPhraseRequest {
            documents: [RequestDocument {
                language: DOCUMENT_LANGUAGE,
                id: id.as_str(),
                text,
            }],
        };

        let response = self
            .http
            .post(self.url.clone())
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| KeyPhraseError::Transport {
                message: err.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(KeyPhraseError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let parsed: KeyPhraseResponse =
            response
                .json()
                .await
                .map_err(|err| KeyPhraseError::MalformedResponse {
                    message: err.to_string(),
                })?;

        let document = parsed.documents.into_iter().next().ok_or_else(|| {
            KeyPhraseError::MalformedResponse {
                message: "response contains no documents".to_owned(),
            }
        })?;
        if document.id.as_deref().is_some_and(|got| got != id.as_str()) {
            debug!(returned_id = ?document.id, "Response document id differs from request");
        }
        Ok(KeyPhraseResult::new(document.key_phrases))
    }
}

impl std::fmt::Debug for TextAnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAnalyticsClient")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyPhraseExtractor for TextAnalyticsClient {
    async fn extract_key_phrases(&self, text: &str) -> Result<KeyPhraseResult, KeyPhraseError> {
        let id = DocumentId::from_timestamp_millis(Utc::now().timestamp_millis());
        let span = debug_span!("key_phrases", document_id = %id, body_chars = text.chars().count());
        self.request(&id, text).instrument(span).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client_for(server: &MockServer) -> TextAnalyticsClient {
        TextAnalyticsClient::new(&TextAnalyticsConfig::new(server.uri(), "secret-key")).unwrap()
    }

    #[test]
    fn test_url_replaces_endpoint_path() {
        let config = TextAnalyticsConfig::new("https://westus.api.example.com/base/", "k");
        assert_eq!(
            config.key_phrases_url().unwrap().as_str(),
            "https://westus.api.example.com/text/analytics/v2.1/keyPhrases"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_configuration_error() {
        let config = TextAnalyticsConfig::new("not a url", "k");
        assert!(matches!(
            TextAnalyticsClient::new(&config),
            Err(TriageError::ConfigurationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_returns_key_phrases_of_first_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(KEY_PHRASES_PATH))
            .and(header(SUBSCRIPTION_KEY_HEADER, "secret-key"))
            .and(body_partial_json(json!({
                "documents": [{ "language": "en", "text": "issue body text" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [{ "id": "1", "keyPhrases": ["Resource Manager", "storage"] }],
                "errors": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .await
            .extract_key_phrases("issue body text")
            .await
            .unwrap();
        assert_eq!(result.phrases(), ["Resource Manager", "storage"]);
    }

    #[tokio::test]
    async fn test_non_200_is_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .extract_key_phrases("text")
            .await
            .unwrap_err();
        assert!(matches!(err, KeyPhraseError::UnexpectedStatus { status: 401 }));
    }

    #[tokio::test]
    async fn test_missing_documents_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .extract_key_phrases("text")
            .await
            .unwrap_err();
        assert!(matches!(err, KeyPhraseError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .extract_key_phrases("text")
            .await
            .unwrap_err();
        assert!(matches!(err, KeyPhraseError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "documents": [{ "keyPhrases": [] }] }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = TextAnalyticsConfig::new(server.uri(), "secret-key")
            .with_timeout(Duration::from_millis(200));
        let err = TextAnalyticsClient::new(&config)
            .unwrap()
            .extract_key_phrases("text")
            .await
            .unwrap_err();
        assert!(matches!(err, KeyPhraseError::Transport { .. }));
    }
}
