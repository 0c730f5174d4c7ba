//! Process configuration, read once from the environment at start-up.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use github::{GithubAuth, GithubConfig};
use text_analytics::TextAnalyticsConfig;
use triage::TriageError;

const DEFAULT_PORT: u16 = 3000;

/// Output format of the fmt tracing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Everything the composition root needs.
#[derive(Clone)]
pub struct AppConfig {
    pub github: GithubConfig,
    pub webhook_secret: String,
    /// `None` disables key-phrase enrichment.
    pub text_analytics: Option<TextAnalyticsConfig>,
    pub bind: SocketAddr,
    pub log_format: LogFormat,
    /// OTLP collector endpoint; `None` disables trace export.
    pub otlp_endpoint: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("github", &self.github)
            .field("webhook_secret", &"<redacted>")
            .field("text_analytics", &self.text_analytics)
            .field("bind", &self.bind)
            .field("log_format", &self.log_format)
            .field("otlp_endpoint", &self.otlp_endpoint)
            .finish()
    }
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, TriageError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TriageError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| config_error(format!("{key} is not set")));

        let auth = match (get("APP_ID"), get("PRIVATE_KEY")) {
            (Some(app_id), Some(private_key)) => GithubAuth::App {
                app_id: parse(&app_id, "APP_ID")?,
                // Keys passed on one line carry escaped newlines.
                private_key: private_key.replace("\\n", "\n"),
            },
            (None, None) => GithubAuth::Token(get("GITHUB_TOKEN").ok_or_else(|| {
                config_error("either GITHUB_TOKEN or APP_ID and PRIVATE_KEY must be set".to_owned())
            })?),
            _ => {
                return Err(config_error(
                    "APP_ID and PRIVATE_KEY must be set together".to_owned(),
                ))
            }
        };
        let github = GithubConfig {
            auth,
            api_base: get("GITHUB_API_URL"),
        };
        let webhook_secret = require("WEBHOOK_SECRET")?;

        let text_analytics = match (get("TEXT_ANALYTICS_ENDPOINT"), get("TEXT_ANALYTICS_KEY")) {
            (Some(endpoint), Some(key)) => {
                let mut config = TextAnalyticsConfig::new(endpoint, key);
                if let Some(raw) = get("TEXT_ANALYTICS_TIMEOUT_SECS") {
                    let secs: u64 = parse(&raw, "TEXT_ANALYTICS_TIMEOUT_SECS")?;
                    config = config.with_timeout(Duration::from_secs(secs));
                }
                Some(config)
            }
            _ => None,
        };

        let host: IpAddr = match get("HOST") {
            Some(raw) => parse(&raw, "HOST")?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port: u16 = match get("PORT") {
            Some(raw) => parse(&raw, "PORT")?,
            None => DEFAULT_PORT,
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => {
                return Err(config_error(format!(
                    "LOG_FORMAT must be 'json' or 'pretty', got '{other}'"
                )))
            }
        };

        Ok(Self {
            github,
            webhook_secret,
            text_analytics,
            bind: SocketAddr::new(host, port),
            log_format,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn parse<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T, TriageError> {
    raw.trim()
        .parse()
        .map_err(|_| config_error(format!("{key} has invalid value '{raw}'")))
}

fn config_error(message: String) -> TriageError {
    TriageError::ConfigurationError { message }
}
