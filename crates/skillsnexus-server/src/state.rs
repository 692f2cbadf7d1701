//! Process-wide application state handed to every handler.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use skillsnexus_shared::catalog::Catalog;
use skillsnexus_shared::chat::{BreakoutRoom, SupportConversation};
use skillsnexus_shared::fixtures::{default_courses, learning_personas};
use skillsnexus_shared::navigation::CourseNavigator;
use skillsnexus_shared::persona::Persona;
use skillsnexus_shared::session::UserContext;

use crate::adapters::Adapters;
use crate::checkouts::CheckoutBook;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::quota::GenerationQuota;
use crate::referrals::ReferralRegistry;
use crate::webhook::SupportWebhook;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub adapters: Adapters,
    pub referrals: ReferralRegistry,
    pub quota: GenerationQuota,
    pub webhook: SupportWebhook,
    pub catalog: Arc<RwLock<Catalog>>,
    pub personas: Arc<Vec<Persona>>,
    pub user: Arc<RwLock<UserContext>>,
    pub selected_persona: Arc<RwLock<Option<String>>>,
    /// Open course viewers, each holding its own catalog snapshot.
    pub viewers: Arc<RwLock<HashMap<Uuid, CourseNavigator>>>,
    pub checkouts: CheckoutBook,
    /// Email of the signed-in partner, if any.
    pub partner: Arc<RwLock<Option<String>>>,
    pub support: Arc<RwLock<SupportConversation>>,
    pub breakout: Arc<RwLock<BreakoutRoom>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let referrals = ReferralRegistry::default();
        let adapters = Adapters::from_config(&config, referrals.clone());
        Self::with_adapters(config, adapters, referrals)
    }

    pub fn with_adapters(
        config: ServerConfig,
        adapters: Adapters,
        referrals: ReferralRegistry,
    ) -> Self {
        let quota = GenerationQuota::from_config(&config);
        let webhook = SupportWebhook::new(Client::new(), config.support_webhook_url.clone());

        Self {
            config: Arc::new(config),
            adapters,
            referrals,
            quota,
            webhook,
            catalog: Arc::new(RwLock::new(Catalog::new(default_courses()))),
            personas: Arc::new(learning_personas()),
            user: Arc::new(RwLock::new(UserContext::default())),
            selected_persona: Arc::new(RwLock::new(None)),
            viewers: Arc::new(RwLock::new(HashMap::new())),
            checkouts: CheckoutBook::default(),
            partner: Arc::new(RwLock::new(None)),
            support: Arc::new(RwLock::new(SupportConversation::default())),
            breakout: Arc::new(RwLock::new(BreakoutRoom::new())),
            started_at: Instant::now(),
        }
    }

    pub fn persona(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Fold the identity provider's current session into the user context.
    pub async fn sync_session(&self) -> UserContext {
        let session = self.adapters.identity.subscribe().borrow().clone();
        let mut user = self.user.write().await;
        user.apply_session(session.as_ref());
        user.clone()
    }

    /// Keep the user context in step with identity notifications for the
    /// life of the process.
    pub fn spawn_session_sync(&self) -> JoinHandle<()> {
        let mut rx = self.adapters.identity.subscribe();
        let user = self.user.clone();
        tokio::spawn(async move {
            loop {
                let session = rx.borrow_and_update().clone();
                {
                    let mut user = user.write().await;
                    user.apply_session(session.as_ref());
                    debug!(authenticated = user.is_authenticated, "Session notification applied");
                }
                if rx.changed().await.is_err() {
                    info!("Identity provider closed, session sync stopped");
                    break;
                }
            }
        })
    }

    /// Guard for routes that need a signed-in learner.
    pub async fn require_session(&self) -> Result<UserContext, ServerError> {
        let user = self.user.read().await;
        if user.is_authenticated {
            Ok(user.clone())
        } else {
            Err(ServerError::Unauthenticated)
        }
    }

    /// Guard for partner-console routes. Returns the partner's email.
    pub async fn require_partner(&self) -> Result<String, ServerError> {
        self.partner
            .read()
            .await
            .clone()
            .ok_or_else(|| skillsnexus_shared::error::PartnerAccessError::NotLoggedIn.into())
    }
}
