//! Best-effort forwarding of support messages to a partner webhook.

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use skillsnexus_shared::chat::ChatMessage;

#[derive(Clone)]
pub struct SupportWebhook {
    client: Client,
    url: Arc<RwLock<Option<String>>>,
}

impl SupportWebhook {
    pub fn new(client: Client, url: Option<String>) -> Self {
        Self {
            client,
            url: Arc::new(RwLock::new(url)),
        }
    }

    pub async fn url(&self) -> Option<String> {
        self.url.read().await.clone()
    }

    /// Replace the target. An empty string disables forwarding.
    pub async fn set_url(&self, url: &str) -> Option<String> {
        let url = Some(url.trim().to_string()).filter(|u| !u.is_empty());
        *self.url.write().await = url.clone();
        url
    }

    /// POST `message` in the background. Failures are only logged.
    pub async fn forward(&self, message: &ChatMessage) {
        let Some(url) = self.url().await else {
            return;
        };

        let client = self.client.clone();
        let message = message.clone();
        tokio::spawn(async move {
            match client.post(&url).json(&message).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(url = %url, id = %message.id, "Support message forwarded");
                }
                Ok(resp) => {
                    warn!(url = %url, status = %resp.status(), "Support webhook rejected message");
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Support webhook failed");
                }
            }
        });
    }
}
