//! Identity provider: Firebase Identity Toolkit or an in-memory sandbox.
//!
//! Both implementations publish session changes on a `watch` channel. A new
//! subscriber sees the current session immediately and every transition
//! after that.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, Url};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use skillsnexus_shared::constants::SANDBOX_SIGN_IN_DELAY;
use skillsnexus_shared::session::{AuthProvider, SessionIdentity};

use super::{send_json, AdapterError};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const IDP_REQUEST_URI: &str = "http://localhost";

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sign in through `provider`. `credential` is the provider's OAuth
    /// token obtained by the browser; the sandbox ignores it.
    async fn sign_in(
        &self,
        provider: AuthProvider,
        credential: Option<&str>,
    ) -> Result<SessionIdentity, AdapterError>;

    async fn sign_out(&self);

    fn subscribe(&self) -> watch::Receiver<Option<SessionIdentity>>;
}

// ---------------------------------------------------------------------------
// Sandbox
// ---------------------------------------------------------------------------

const MOCK_UID: &str = "mock-user-sa-123";
const MOCK_EMAIL: &str = "student@skillsnexus.africa";
const MOCK_NAME: &str = "Thabo Mokoena";
const MOCK_PHOTO: &str = "https://images.unsplash.com/photo-1506277886164-e25aa3f4ef7f?ixlib=rb-4.0.3&auto=format&fit=crop&w=200&q=80";

/// Stores a mock user in memory after a short simulated delay.
pub struct SandboxIdentity {
    session: watch::Sender<Option<SessionIdentity>>,
    delay: Duration,
}

impl SandboxIdentity {
    pub fn new(delay: Duration) -> Self {
        let (session, _) = watch::channel(None);
        Self { session, delay }
    }
}

impl Default for SandboxIdentity {
    fn default() -> Self {
        Self::new(SANDBOX_SIGN_IN_DELAY)
    }
}

#[async_trait]
impl IdentityProvider for SandboxIdentity {
    fn name(&self) -> &'static str {
        "sandbox"
    }

    async fn sign_in(
        &self,
        provider: AuthProvider,
        _credential: Option<&str>,
    ) -> Result<SessionIdentity, AdapterError> {
        debug!(provider = provider.label(), "Simulating sign in");
        tokio::time::sleep(self.delay).await;

        let user = SessionIdentity {
            uid: MOCK_UID.to_string(),
            email: Some(MOCK_EMAIL.to_string()),
            display_name: Some(format!("{MOCK_NAME} ({})", provider.label())),
            photo_url: Some(MOCK_PHOTO.to_string()),
        };
        self.session.send_replace(Some(user.clone()));
        info!(uid = %user.uid, "Sandbox user signed in");
        Ok(user)
    }

    async fn sign_out(&self) {
        self.session.send_replace(None);
        info!("Sandbox user signed out");
    }

    fn subscribe(&self) -> watch::Receiver<Option<SessionIdentity>> {
        self.session.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Firebase
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

/// Exchanges a provider OAuth token for a Firebase session via
/// `accounts:signInWithIdp`.
pub struct FirebaseIdentity {
    client: Client,
    api_key: String,
    base_url: String,
    session: watch::Sender<Option<SessionIdentity>>,
}

impl FirebaseIdentity {
    pub fn new(client: Client, api_key: String) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            client,
            api_key,
            base_url: IDENTITY_TOOLKIT_URL.to_string(),
            session,
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    fn name(&self) -> &'static str {
        "firebase"
    }

    async fn sign_in(
        &self,
        provider: AuthProvider,
        credential: Option<&str>,
    ) -> Result<SessionIdentity, AdapterError> {
        let Some(token) = credential.filter(|t| !t.is_empty()) else {
            return Err(AdapterError::Rejected(format!(
                "{} sign in requires a provider credential",
                provider.label()
            )));
        };

        // Google hands the browser an ID token, Facebook an access token.
        let token_field = match provider {
            AuthProvider::Google => "id_token",
            AuthProvider::Facebook => "access_token",
        };
        let post_body = idp_post_body(token_field, token, provider.provider_id())
            .ok_or_else(|| AdapterError::Rejected("Could not encode sign in credential".into()))?;
        let body = json!({
            "postBody": post_body,
            "requestUri": IDP_REQUEST_URI,
            "returnSecureToken": true,
            "returnIdpCredential": true,
        });
        let url = format!("{}/accounts:signInWithIdp?key={}", self.base_url, self.api_key);

        let response: SignInWithIdpResponse =
            match send_json(&self.client, &url, &body, HeaderMap::new()).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(provider = provider.label(), error = %e, "Sign in failed");
                    return Err(e);
                }
            };

        let user = SessionIdentity {
            uid: response.local_id,
            email: response.email,
            display_name: response.display_name,
            photo_url: response.photo_url,
        };
        self.session.send_replace(Some(user.clone()));
        info!(uid = %user.uid, provider = provider.label(), "User signed in");
        Ok(user)
    }

    async fn sign_out(&self) {
        // ID tokens are stateless; dropping the session is all sign-out needs.
        self.session.send_replace(None);
        info!("User signed out");
    }

    fn subscribe(&self) -> watch::Receiver<Option<SessionIdentity>> {
        self.session.subscribe()
    }
}

/// Form-encoded `postBody` for `signInWithIdp`.
fn idp_post_body(token_field: &str, token: &str, provider_id: &str) -> Option<String> {
    let url = Url::parse_with_params(
        IDP_REQUEST_URI,
        &[(token_field, token), ("providerId", provider_id)],
    )
    .ok()?;
    url.query().map(str::to_owned)
}
