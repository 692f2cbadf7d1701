//! Third-party service adapters.
//!
//! Each capability is a trait with a real implementation backed by the
//! vendor's HTTP API and a sandbox implementation that runs fully offline.
//! [`Adapters::from_config`] picks one per capability at startup, based on
//! which credentials are configured. Call sites never check credentials.

pub mod identity;
pub mod payment;
pub mod tutor;
pub mod video;

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::ServerConfig;
use crate::referrals::ReferralRegistry;

pub use identity::IdentityProvider;
pub use payment::PaymentGateway;
pub use tutor::TutorModel;
pub use video::VideoGenerator;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Request failed: {0}")]
    Transport(reqwest::Error),

    #[error("Unexpected status {0}: {1}")]
    Status(StatusCode, String),

    #[error("{0}")]
    Rejected(String),
}

/// Query strings carry API keys, so the URL is dropped before the error
/// can reach a log line or a response body.
impl From<reqwest::Error> for AdapterError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url())
    }
}

/// POST a JSON body and decode a JSON response. Non-success statuses
/// become [`AdapterError::Status`] carrying the response text.
pub(crate) async fn send_json<T: Serialize + ?Sized, R: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &T,
    headers: reqwest::header::HeaderMap,
) -> Result<R, AdapterError> {
    let response = client.post(url).headers(headers).json(data).send().await?;
    decode_json(response).await
}

/// GET and decode a JSON response.
pub(crate) async fn get_json<R: DeserializeOwned>(client: &Client, url: &str) -> Result<R, AdapterError> {
    let response = client.get(url).send().await?;
    decode_json(response).await
}

async fn decode_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, AdapterError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AdapterError::Status(
            status,
            response.text().await.unwrap_or_default(),
        ));
    }
    Ok(response.json::<R>().await?)
}

/// The adapter set chosen for this process.
#[derive(Clone)]
pub struct Adapters {
    pub identity: Arc<dyn IdentityProvider>,
    pub payment: Arc<dyn PaymentGateway>,
    pub tutor: Arc<dyn TutorModel>,
    pub video: Arc<dyn VideoGenerator>,
}

impl Adapters {
    pub fn from_config(config: &ServerConfig, referrals: ReferralRegistry) -> Self {
        let client = Client::new();

        let identity: Arc<dyn IdentityProvider> = match &config.firebase_api_key {
            Some(key) => Arc::new(identity::FirebaseIdentity::new(client.clone(), key.clone())),
            None => Arc::new(identity::SandboxIdentity::default()),
        };

        let payment: Arc<dyn PaymentGateway> = match &config.yoco_secret_key {
            Some(secret) => Arc::new(payment::YocoGateway::new(
                client.clone(),
                secret.clone(),
                config.yoco_public_key.clone(),
                referrals,
            )),
            None => Arc::new(payment::SandboxGateway::new(config.payment_delay, referrals)),
        };

        let (tutor, video): (Arc<dyn TutorModel>, Arc<dyn VideoGenerator>) =
            match &config.gemini_api_key {
                Some(key) => (
                    Arc::new(tutor::GeminiTutor::new(
                        client.clone(),
                        &config.gemini_base_url,
                        key.clone(),
                    )),
                    Arc::new(video::PollingVideoGenerator::new(
                        Arc::new(video::VeoOperations::new(
                            client,
                            &config.gemini_base_url,
                            key.clone(),
                        )),
                        key.clone(),
                        config.video_poll_interval,
                        config.video_poll_max_attempts,
                    )),
                ),
                None => (
                    Arc::new(tutor::UnconfiguredTutor),
                    Arc::new(video::UnconfiguredVideo),
                ),
            };

        info!(
            identity = identity.name(),
            payment = payment.name(),
            tutor = tutor.name(),
            video = video.name(),
            "Adapters selected"
        );

        Self {
            identity,
            payment,
            tutor,
            video,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_config_uses_sandboxes() {
        let adapters = Adapters::from_config(&ServerConfig::default(), ReferralRegistry::default());
        assert_eq!(adapters.identity.name(), "sandbox");
        assert_eq!(adapters.payment.name(), "sandbox");
        assert_eq!(adapters.tutor.name(), "unconfigured");
        assert_eq!(adapters.video.name(), "unconfigured");
        assert!(adapters.payment.is_initialized());
    }

    #[test]
    fn test_credentials_select_real_adapters() {
        let config = ServerConfig {
            gemini_api_key: Some("g".into()),
            firebase_api_key: Some("f".into()),
            yoco_secret_key: Some("sk_test".into()),
            ..Default::default()
        };
        let adapters = Adapters::from_config(&config, ReferralRegistry::default());
        assert_eq!(adapters.identity.name(), "firebase");
        assert_eq!(adapters.payment.name(), "yoco");
        assert_eq!(adapters.tutor.name(), "gemini");
        assert_eq!(adapters.video.name(), "veo");
    }

    #[tokio::test]
    async fn test_transport_error_hides_key() {
        // Nothing listens on port 1.
        let err = get_json::<serde_json::Value>(&Client::new(), "http://127.0.0.1:1/v1?key=sk-live-secret")
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Transport(_)));
        assert!(!err.to_string().contains("sk-live-secret"));
        assert!(!format!("{err:?}").contains("sk-live-secret"));
    }
}
