//! Video studio: Veo long-running generation with a bounded poll loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};

use skillsnexus_shared::constants::{
    VIDEO_ASPECT_RATIO, VIDEO_KEY_MISSING, VIDEO_MODEL, VIDEO_NO_URI, VIDEO_RESOLUTION,
    VIDEO_TIMED_OUT,
};

use super::{get_json, send_json, AdapterError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoOutcome {
    pub video_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VideoOutcome {
    fn ready(uri: String) -> Self {
        Self {
            video_uri: Some(uri),
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            video_uri: None,
            error: Some(message.into()),
        }
    }
}

#[async_trait]
pub trait VideoGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generate a clip for `prompt`. Never panics and always returns within
    /// the configured poll budget.
    async fn generate(&self, prompt: &str) -> VideoOutcome;
}

pub struct UnconfiguredVideo;

#[async_trait]
impl VideoGenerator for UnconfiguredVideo {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn generate(&self, _prompt: &str) -> VideoOutcome {
        VideoOutcome::failed(VIDEO_KEY_MISSING)
    }
}

// ---------------------------------------------------------------------------
// Long-running operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

impl Operation {
    fn video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()?
            .uri
            .as_deref()
    }
}

/// Start and refresh long-running generation jobs.
#[async_trait]
pub trait VideoOperations: Send + Sync {
    async fn start(&self, prompt: &str) -> Result<Operation, AdapterError>;

    async fn refresh(&self, operation: &Operation) -> Result<Operation, AdapterError>;
}

/// Veo over the Generative Language REST API.
pub struct VeoOperations {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VeoOperations {
    pub fn new(client: Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl VideoOperations for VeoOperations {
    async fn start(&self, prompt: &str) -> Result<Operation, AdapterError> {
        let url = format!(
            "{}/models/{}:predictLongRunning?key={}",
            self.base_url, VIDEO_MODEL, self.api_key
        );
        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": 1,
                "resolution": VIDEO_RESOLUTION,
                "aspectRatio": VIDEO_ASPECT_RATIO,
            },
        });
        send_json(&self.client, &url, &body, HeaderMap::new()).await
    }

    async fn refresh(&self, operation: &Operation) -> Result<Operation, AdapterError> {
        let url = format!("{}/{}?key={}", self.base_url, operation.name, self.api_key);
        get_json(&self.client, &url).await
    }
}

/// Append the API key so the URI can be fetched directly.
fn with_key(uri: &str, api_key: &str) -> String {
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{separator}key={api_key}")
}

/// Runs one job to completion or until the attempt budget is spent.
pub struct PollingVideoGenerator {
    operations: Arc<dyn VideoOperations>,
    api_key: String,
    interval: Duration,
    max_attempts: u32,
}

impl PollingVideoGenerator {
    pub fn new(
        operations: Arc<dyn VideoOperations>,
        api_key: String,
        interval: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            operations,
            api_key,
            interval,
            max_attempts,
        }
    }

    async fn run(&self, prompt: &str) -> Result<VideoOutcome, AdapterError> {
        let mut operation = self.operations.start(prompt).await?;
        info!(operation = %operation.name, "Video generation started");

        let mut remaining = self.max_attempts;
        while !operation.done && remaining > 0 {
            tokio::time::sleep(self.interval).await;
            operation = self.operations.refresh(&operation).await?;
            remaining -= 1;
            debug!(operation = %operation.name, done = operation.done, remaining, "Polled video job");
        }

        if !operation.done {
            return Ok(VideoOutcome::failed(VIDEO_TIMED_OUT));
        }
        if let Some(err) = &operation.error {
            return Ok(VideoOutcome::failed(err.message.clone()));
        }

        Ok(match operation.video_uri() {
            Some(uri) => VideoOutcome::ready(with_key(uri, &self.api_key)),
            None => VideoOutcome::failed(VIDEO_NO_URI),
        })
    }
}

#[async_trait]
impl VideoGenerator for PollingVideoGenerator {
    fn name(&self) -> &'static str {
        "veo"
    }

    async fn generate(&self, prompt: &str) -> VideoOutcome {
        match self.run(prompt).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Video generation error");
                VideoOutcome::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Finishes after `done_after` refreshes.
    struct ScriptedOperations {
        done_after: u32,
        refreshes: AtomicU32,
        uri: Option<&'static str>,
    }

    impl ScriptedOperations {
        fn new(done_after: u32, uri: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                done_after,
                refreshes: AtomicU32::new(0),
                uri,
            })
        }

        fn operation(&self, done: bool) -> Operation {
            let response = self.uri.map(|uri| OperationResponse {
                generate_video_response: Some(GenerateVideoResponse {
                    generated_samples: vec![GeneratedSample {
                        video: Some(VideoRef {
                            uri: Some(uri.to_string()),
                        }),
                    }],
                }),
            });
            Operation {
                name: "operations/abc".into(),
                done,
                error: None,
                response: if done { response } else { None },
            }
        }
    }

    #[async_trait]
    impl VideoOperations for ScriptedOperations {
        async fn start(&self, _prompt: &str) -> Result<Operation, AdapterError> {
            Ok(self.operation(self.done_after == 0))
        }

        async fn refresh(&self, _operation: &Operation) -> Result<Operation, AdapterError> {
            let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(self.operation(n >= self.done_after))
        }
    }

    struct FailingOperations;

    #[async_trait]
    impl VideoOperations for FailingOperations {
        async fn start(&self, _prompt: &str) -> Result<Operation, AdapterError> {
            Err(AdapterError::Rejected("quota exceeded".into()))
        }

        async fn refresh(&self, _operation: &Operation) -> Result<Operation, AdapterError> {
            unreachable!("start never succeeds")
        }
    }

    fn generator(ops: Arc<dyn VideoOperations>, max_attempts: u32) -> PollingVideoGenerator {
        PollingVideoGenerator::new(ops, "KEY".into(), Duration::from_millis(1), max_attempts)
    }

    #[tokio::test]
    async fn test_unconfigured_reports_missing_key() {
        let outcome = UnconfiguredVideo.generate("a lion").await;
        assert_eq!(outcome.video_uri, None);
        assert_eq!(outcome.error.as_deref(), Some("API Key missing"));

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json["videoUri"].is_null());
    }

    #[tokio::test]
    async fn test_completes_and_appends_key() {
        let ops = ScriptedOperations::new(3, Some("https://files/v1/video?alt=media"));
        let outcome = generator(ops.clone(), 20).generate("prompt").await;

        assert_eq!(
            outcome.video_uri.as_deref(),
            Some("https://files/v1/video?alt=media&key=KEY")
        );
        assert_eq!(ops.refreshes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out_after_attempt_budget() {
        let ops = ScriptedOperations::new(100, Some("https://files/v"));
        let outcome = generator(ops.clone(), 4).generate("prompt").await;

        assert_eq!(outcome.error.as_deref(), Some("Video generation timed out."));
        assert_eq!(ops.refreshes.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_done_without_uri() {
        let ops = ScriptedOperations::new(0, None);
        let outcome = generator(ops.clone(), 4).generate("prompt").await;

        assert_eq!(outcome.error.as_deref(), Some("No video URI returned."));
        assert_eq!(ops.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_error_text_surfaces() {
        let outcome = generator(Arc::new(FailingOperations), 4).generate("prompt").await;
        assert_eq!(outcome.video_uri, None);
        assert_eq!(outcome.error.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn test_key_separator() {
        assert_eq!(with_key("https://a/b", "K"), "https://a/b?key=K");
        assert_eq!(with_key("https://a/b?alt=media", "K"), "https://a/b?alt=media&key=K");
    }
}
