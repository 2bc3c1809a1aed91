use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;
use url::Url;

/// An unexpected-failure event forwarded to the reporting sink.
///
/// Events carry the failure message and the video id it relates to — never
/// client addresses or any other request-identifying data.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub level: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl ErrorEvent {
    pub fn error(message: impl Into<String>, video_id: Option<String>) -> Self {
        Self {
            level: "error",
            message: message.into(),
            video_id,
        }
    }
}

/// Fire-and-forget ingestion of unexpected failures.
///
/// Reporting must never delay or fail a request: implementations hand the
/// event off and return immediately.
pub trait ErrorSink: Send + Sync {
    fn report(&self, event: ErrorEvent);
}

/// A sink that drops every event. Used when no reporting DSN is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ErrorSink for NoopSink {
    fn report(&self, _event: ErrorEvent) {}
}

/// A sink that POSTs each event as JSON to an ingestion endpoint.
///
/// Delivery runs on a detached task; a failed delivery is logged and
/// otherwise ignored.
pub struct HttpErrorSink {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpErrorSink {
    pub fn new(dsn: &str) -> Result<Self> {
        let endpoint = Url::parse(dsn).context("error-reporting DSN is not a valid URL")?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .context("failed to build error-reporting client")?;

        Ok(Self { client, endpoint })
    }
}

impl ErrorSink for HttpErrorSink {
    fn report(&self, event: ErrorEvent) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        tokio::spawn(async move {
            if let Err(err) = client.post(endpoint).json(&event).send().await {
                warn!(error = %err, "failed to deliver error report");
            }
        });
    }
}
