use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use skillsnexus_shared::error::PaymentError;
use skillsnexus_shared::fixtures::pricing_tiers;
use skillsnexus_shared::pricing::{CardDetails, Checkout, CheckoutStep, PricingTier};
use skillsnexus_shared::types::Currency;

use crate::adapters::payment::{ChargeReceipt, ChargeRequest};
use crate::error::ServerError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierView {
    #[serde(flatten)]
    tier: PricingTier,
    currency: Currency,
    symbol: &'static str,
    price: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    checkout_id: Uuid,
    tier_id: String,
    tier_name: String,
    currency: Currency,
    symbol: &'static str,
    step: CheckoutStep,
    original_price: u64,
    final_price: u64,
    discount_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    discount_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    discount_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_error: Option<String>,
    card: CardDetails,
}

impl CheckoutView {
    fn new(checkout_id: Uuid, checkout: &Checkout) -> Self {
        let currency = checkout.currency();
        Self {
            checkout_id,
            tier_id: checkout.tier().id.clone(),
            tier_name: checkout.tier().name.clone(),
            currency,
            symbol: currency.symbol(),
            step: checkout.step(),
            original_price: checkout.original_price(),
            final_price: checkout.final_price(),
            discount_percent: checkout.discount_percent(),
            applied_code: checkout.applied().map(|rc| rc.code.clone()),
            discount_message: checkout.discount_message().map(str::to_string),
            discount_error: checkout.discount_error().map(str::to_string),
            payment_error: checkout.payment_error().map(str::to_string),
            card: checkout.card().clone(),
        }
    }
}

#[derive(Serialize)]
pub struct PaymentResponse {
    checkout: CheckoutView,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<ChargeReceipt>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCheckoutRequest {
    tier_id: String,
}

#[derive(Deserialize)]
pub struct ReferralRequest {
    code: String,
}

pub async fn pricing(State(state): State<AppState>) -> Json<Vec<TierView>> {
    let currency = state.user.read().await.currency;
    Json(
        pricing_tiers()
            .into_iter()
            .map(|tier| TierView {
                price: tier.price_in(currency),
                tier,
                currency,
                symbol: currency.symbol(),
            })
            .collect(),
    )
}

/// Open a checkout for a tier in the learner's current currency.
pub async fn start(
    State(state): State<AppState>,
    Json(req): Json<StartCheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutView>), ServerError> {
    let tier = pricing_tiers()
        .into_iter()
        .find(|t| t.id == req.tier_id)
        .ok_or_else(|| ServerError::NotFound(format!("pricing tier {}", req.tier_id)))?;
    let currency = state.user.read().await.currency;

    let checkout = Checkout::new(tier, currency);
    let checkout_id = state.checkouts.open(checkout.clone()).await;
    let view = CheckoutView::new(checkout_id, &checkout);

    info!(checkout = %checkout_id, tier = %req.tier_id, currency = currency.code(), "Checkout started");
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(checkout_id): Path<Uuid>,
) -> Result<Json<CheckoutView>, ServerError> {
    state
        .checkouts
        .read(checkout_id, |c| Json(CheckoutView::new(checkout_id, c)))
        .await
        .ok_or_else(|| checkout_not_found(checkout_id))
}

/// Abandon or dismiss a checkout.
pub async fn close(
    State(state): State<AppState>,
    Path(checkout_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    if state.checkouts.close(checkout_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(checkout_not_found(checkout_id))
    }
}

/// Apply a referral code looked up through the payment gateway. An invalid
/// code is reported on the checkout, not as an HTTP error.
pub async fn apply_referral(
    State(state): State<AppState>,
    Path(checkout_id): Path<Uuid>,
    Json(req): Json<ReferralRequest>,
) -> Result<Json<CheckoutView>, ServerError> {
    let found = state.adapters.payment.validate_referral(&req.code).await;

    let (applied, view) = state
        .checkouts
        .update(checkout_id, |c| {
            let applied = c.apply_lookup(&req.code, found)?;
            Ok::<_, PaymentError>((applied, CheckoutView::new(checkout_id, c)))
        })
        .await
        .ok_or_else(|| checkout_not_found(checkout_id))??;

    info!(checkout = %checkout_id, applied, final_price = view.final_price, "Referral code submitted");
    Ok(Json(view))
}

pub async fn remove_referral(
    State(state): State<AppState>,
    Path(checkout_id): Path<Uuid>,
) -> Result<Json<CheckoutView>, ServerError> {
    edit(&state, checkout_id, Checkout::remove_code).await
}

pub async fn set_card(
    State(state): State<AppState>,
    Path(checkout_id): Path<Uuid>,
    Json(card): Json<CardDetails>,
) -> Result<Json<CheckoutView>, ServerError> {
    edit(&state, checkout_id, |c| c.set_card(card)).await
}

async fn edit<F>(state: &AppState, checkout_id: Uuid, op: F) -> Result<Json<CheckoutView>, ServerError>
where
    F: FnOnce(&mut Checkout) -> Result<(), PaymentError>,
{
    let view = state
        .checkouts
        .update(checkout_id, |c| {
            op(c)?;
            Ok::<_, PaymentError>(CheckoutView::new(checkout_id, c))
        })
        .await
        .ok_or_else(|| checkout_not_found(checkout_id))??;
    Ok(Json(view))
}

/// Stand-in for the token the inline card form would produce.
fn card_token() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("tok_{suffix}")
}

/// Charge the final price. A failed charge puts the checkout back on the
/// details step with a retry prompt and the form intact.
pub async fn pay(
    State(state): State<AppState>,
    Path(checkout_id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ServerError> {
    let request = state
        .checkouts
        .update(checkout_id, |c| -> Result<ChargeRequest, ServerError> {
            if !c.card().is_complete() {
                return Err(ServerError::BadRequest("Card details are incomplete".into()));
            }
            c.begin_payment()?;
            Ok(ChargeRequest {
                amount_minor_units: c.amount_minor_units(),
                currency: c.currency(),
                token: card_token(),
                referral_code: c.charge_referral(),
            })
        })
        .await
        .ok_or_else(|| checkout_not_found(checkout_id))??;

    // No lock is held while the gateway works.
    let result = state.adapters.payment.charge(request).await;

    let view = state
        .checkouts
        .update(checkout_id, |c| {
            match &result {
                Ok(_) => c.payment_succeeded(),
                Err(_) => c.payment_failed(),
            }
            CheckoutView::new(checkout_id, c)
        })
        .await
        .ok_or_else(|| checkout_not_found(checkout_id))?;

    let receipt = match result {
        Ok(receipt) => {
            info!(checkout = %checkout_id, charge = %receipt.id, amount = receipt.amount, "Payment succeeded");
            Some(receipt)
        }
        Err(e) => {
            warn!(checkout = %checkout_id, error = %e, "Payment failed");
            None
        }
    };

    Ok(Json(PaymentResponse {
        checkout: view,
        receipt,
    }))
}

fn checkout_not_found(checkout_id: Uuid) -> ServerError {
    ServerError::NotFound(format!("checkout {checkout_id}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::Router;
    use serde_json::{json, Value};

    use skillsnexus_shared::error::PaymentError;
    use skillsnexus_shared::pricing::ReferralCode;

    use crate::adapters::payment::{ChargeReceipt, ChargeRequest, PaymentGateway};
    use crate::api::build_router;
    use crate::api::test_support::*;
    use crate::referrals::ReferralRegistry;

    async fn start(router: &Router, tier: &str) -> (String, Value) {
        let (status, body) = call(router, "POST", "/checkout", Some(json!({ "tierId": tier }))).await;
        assert_eq!(status, StatusCode::CREATED);
        (body["checkoutId"].as_str().unwrap().to_string(), body)
    }

    async fn apply(router: &Router, id: &str, code: &str) -> Value {
        let (status, body) = call(
            router,
            "POST",
            &format!("/checkouts/{id}/referral"),
            Some(json!({ "code": code })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_pricing_follows_currency() {
        let router = build_router(test_state());
        let (_, body) = call(&router, "GET", "/pricing", None).await;
        assert_eq!(body[0]["price"], 1997);
        assert_eq!(body[0]["symbol"], "R");

        call(&router, "PUT", "/session/currency", Some(json!({ "currency": "USD" }))).await;
        let (_, body) = call(&router, "GET", "/pricing", None).await;
        assert_eq!(body[0]["price"], 147);
        assert_eq!(body[0]["priceZAR"], 1997);
    }

    #[tokio::test]
    async fn test_referral_discount_and_removal() {
        let router = build_router(test_state());
        let (id, body) = start(&router, "basic_tier").await;
        assert_eq!(body["finalPrice"], 1997);

        let body = apply(&router, &id, "jmdev20").await;
        assert_eq!(body["finalPrice"], 1597);
        assert_eq!(body["discountMessage"], "Success! 20% discount applied.");

        let (_, body) = call(&router, "DELETE", &format!("/checkouts/{id}/referral"), None).await;
        assert_eq!(body["finalPrice"], 1997);
        assert!(body.get("appliedCode").is_none());
    }

    #[tokio::test]
    async fn test_invalid_code_keeps_price() {
        let router = build_router(test_state());
        let (id, _) = start(&router, "premium_tier").await;

        let body = apply(&router, &id, "NOTACODE").await;
        assert_eq!(body["finalPrice"], 3997);
        assert_eq!(body["discountError"], "Invalid or expired referral code.");
    }

    #[tokio::test]
    async fn test_pay_requires_card() {
        let router = build_router(test_state());
        let (id, _) = start(&router, "basic_tier").await;
        let (status, _) = call(&router, "POST", &format!("/checkouts/{id}/pay"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_successful_payment() {
        let router = build_router(test_state());
        let (id, _) = start(&router, "basic_tier").await;
        apply(&router, &id, "EARLYBIRD").await;
        call(
            &router,
            "PUT",
            &format!("/checkouts/{id}/card"),
            Some(json!({ "cardNumber": "4111 1111 1111 1111", "expiry": "12/29", "cvc": "123" })),
        )
        .await;

        let (status, body) = call(&router, "POST", &format!("/checkouts/{id}/pay"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checkout"]["step"], "success");
        assert_eq!(body["receipt"]["amount"], 179_700);
        assert_eq!(body["receipt"]["currency"], "ZAR");
        assert!(body["receipt"]["id"].as_str().unwrap().starts_with("ch_"));

        let (status, _) = call(&router, "POST", &format!("/checkouts/{id}/pay"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    struct DecliningGateway(ReferralRegistry);

    #[async_trait]
    impl PaymentGateway for DecliningGateway {
        fn name(&self) -> &'static str {
            "declining"
        }

        fn is_initialized(&self) -> bool {
            true
        }

        fn referrals(&self) -> &ReferralRegistry {
            &self.0
        }

        async fn charge(&self, _request: ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
            Err(PaymentError::Declined("insufficient funds".into()))
        }
    }

    #[tokio::test]
    async fn test_failed_payment_keeps_form() {
        let mut state = test_state();
        state.adapters.payment = Arc::new(DecliningGateway(state.referrals.clone()));
        let router = build_router(state);

        let (id, _) = start(&router, "elite_tier").await;
        let card = json!({ "cardNumber": "4000 0000 0000 0002", "expiry": "01/30", "cvc": "999" });
        call(&router, "PUT", &format!("/checkouts/{id}/card"), Some(card.clone())).await;

        let (status, body) = call(&router, "POST", &format!("/checkouts/{id}/pay"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checkout"]["step"], "details");
        assert_eq!(body["checkout"]["paymentError"], "Payment simulation failed. Please try again.");
        assert_eq!(body["checkout"]["card"], card);
        assert!(body.get("receipt").is_none());
    }

    #[tokio::test]
    async fn test_paid_checkout_is_frozen() {
        let router = build_router(test_state());
        let (id, _) = start(&router, "basic_tier").await;
        let card = json!({ "cardNumber": "4111 1111 1111 1111", "expiry": "12/29", "cvc": "123" });
        call(&router, "PUT", &format!("/checkouts/{id}/card"), Some(card)).await;
        let (_, body) = call(&router, "POST", &format!("/checkouts/{id}/pay"), None).await;
        assert_eq!(body["receipt"]["amount"], 199_700);

        let (status, _) = call(
            &router,
            "POST",
            &format!("/checkouts/{id}/referral"),
            Some(json!({ "code": "ADMIN100" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(&router, "DELETE", &format!("/checkouts/{id}/referral"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let blank = json!({ "cardNumber": "", "expiry": "", "cvc": "" });
        let (status, _) = call(&router, "PUT", &format!("/checkouts/{id}/card"), Some(blank)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = call(&router, "GET", &format!("/checkouts/{id}"), None).await;
        assert_eq!(body["step"], "success");
        assert_eq!(body["finalPrice"], 1997);
        assert!(body.get("appliedCode").is_none());
    }

    #[tokio::test]
    async fn test_close_checkout() {
        let router = build_router(test_state());
        let (id, _) = start(&router, "basic_tier").await;

        let (status, _) = call(&router, "DELETE", &format!("/checkouts/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&router, "GET", &format!("/checkouts/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&router, "DELETE", &format!("/checkouts/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    /// Knows one extra code that the local registry does not.
    struct PartnerCodeGateway(ReferralRegistry);

    #[async_trait]
    impl PaymentGateway for PartnerCodeGateway {
        fn name(&self) -> &'static str {
            "partner-codes"
        }

        fn is_initialized(&self) -> bool {
            true
        }

        fn referrals(&self) -> &ReferralRegistry {
            &self.0
        }

        async fn validate_referral(&self, code: &str) -> Option<ReferralCode> {
            if code.trim().eq_ignore_ascii_case("GATEWAY50") {
                return Some(ReferralCode::new("GATEWAY50", 50, "Gateway"));
            }
            self.0.validate(code).await
        }

        async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
            Ok(ChargeReceipt {
                id: "ch_partner".into(),
                status: "successful".into(),
                amount: request.amount_minor_units,
                currency: request.currency,
            })
        }
    }

    #[tokio::test]
    async fn test_referral_lookup_goes_through_gateway() {
        let mut state = test_state();
        state.adapters.payment = Arc::new(PartnerCodeGateway(state.referrals.clone()));
        let router = build_router(state);

        let (id, _) = start(&router, "basic_tier").await;
        let body = apply(&router, &id, "gateway50").await;
        assert_eq!(body["finalPrice"], 998);
        assert_eq!(body["appliedCode"], "GATEWAY50");
    }

    #[tokio::test]
    async fn test_unknown_tier() {
        let router = build_router(test_state());
        let (status, _) = call(&router, "POST", "/checkout", Some(json!({ "tierId": "gold" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
