//! Payment gateway: Yoco charges API or a simulated gateway.

use std::time::Duration;

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use skillsnexus_shared::error::PaymentError;
use skillsnexus_shared::pricing::ReferralCode;
use skillsnexus_shared::types::Currency;

use super::{send_json, AdapterError};
use crate::referrals::ReferralRegistry;

const YOCO_CHARGES_URL: &str = "https://online.yoco.com/v1/charges/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    pub amount_minor_units: u64,
    pub currency: Currency,
    /// Card token produced by the inline payment form.
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChargeReceipt {
    pub id: String,
    pub status: String,
    pub amount: u64,
    pub currency: Currency,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_initialized(&self) -> bool;

    /// Key the browser needs to mount the card form, if any.
    fn public_key(&self) -> Option<&str> {
        None
    }

    fn referrals(&self) -> &ReferralRegistry;

    async fn validate_referral(&self, code: &str) -> Option<ReferralCode> {
        self.referrals().validate(code).await
    }

    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, PaymentError>;
}

fn log_charge(request: &ChargeRequest) {
    info!(
        amount = request.amount_minor_units,
        currency = request.currency.code(),
        referral = request.referral_code.as_deref().unwrap_or("-"),
        "Processing payment"
    );
}

// ---------------------------------------------------------------------------
// Sandbox
// ---------------------------------------------------------------------------

/// Always succeeds after a fixed delay.
pub struct SandboxGateway {
    delay: Duration,
    referrals: ReferralRegistry,
}

impl SandboxGateway {
    pub fn new(delay: Duration, referrals: ReferralRegistry) -> Self {
        Self { delay, referrals }
    }
}

fn sandbox_charge_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("ch_{suffix}")
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    fn name(&self) -> &'static str {
        "sandbox"
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn referrals(&self) -> &ReferralRegistry {
        &self.referrals
    }

    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        log_charge(&request);
        tokio::time::sleep(self.delay).await;

        Ok(ChargeReceipt {
            id: sandbox_charge_id(),
            status: "successful".to_string(),
            amount: request.amount_minor_units,
            currency: request.currency,
        })
    }
}

// ---------------------------------------------------------------------------
// Yoco
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct YocoCharge {
    id: String,
    status: String,
}

pub struct YocoGateway {
    client: Client,
    secret_key: String,
    public_key: Option<String>,
    url: String,
    referrals: ReferralRegistry,
}

impl YocoGateway {
    pub fn new(
        client: Client,
        secret_key: String,
        public_key: Option<String>,
        referrals: ReferralRegistry,
    ) -> Self {
        Self {
            client,
            secret_key,
            public_key,
            url: YOCO_CHARGES_URL.to_string(),
            referrals,
        }
    }
}

#[async_trait]
impl PaymentGateway for YocoGateway {
    fn name(&self) -> &'static str {
        "yoco"
    }

    fn is_initialized(&self) -> bool {
        !self.secret_key.is_empty()
    }

    fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    fn referrals(&self) -> &ReferralRegistry {
        &self.referrals
    }

    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        if !self.is_initialized() {
            return Err(PaymentError::NotInitialized);
        }
        log_charge(&request);

        let mut headers = HeaderMap::new();
        let secret = HeaderValue::from_str(&self.secret_key)
            .map_err(|_| PaymentError::NotInitialized)?;
        headers.insert("X-Auth-Secret-Key", secret);

        let mut body = json!({
            "token": request.token,
            "amountInCents": request.amount_minor_units,
            "currency": request.currency.code(),
        });
        if let Some(code) = &request.referral_code {
            body["metadata"] = json!({ "referralCode": code });
        }

        let charge: YocoCharge = send_json(&self.client, &self.url, &body, headers)
            .await
            .map_err(|e| {
                warn!(error = %e, "Yoco charge failed");
                match e {
                    AdapterError::Transport(e) => PaymentError::Transport(e.to_string()),
                    AdapterError::Status(_, text) => PaymentError::Declined(text),
                    AdapterError::Rejected(text) => PaymentError::Declined(text),
                }
            })?;

        if charge.status != "successful" {
            return Err(PaymentError::Declined(charge.status));
        }

        Ok(ChargeReceipt {
            id: charge.id,
            status: charge.status,
            amount: request.amount_minor_units,
            currency: request.currency,
        })
    }
}
