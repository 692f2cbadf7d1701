//! Pricing tiers, referral codes, and the checkout state machine.

use serde::{Deserialize, Serialize};

use crate::constants::{PAYMENT_RETRY_PROMPT, REFERRAL_INVALID};
use crate::error::PaymentError;
use crate::types::Currency;

// ---------------------------------------------------------------------------
// Tiers and codes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub id: String,
    pub name: String,
    #[serde(rename = "priceUSD")]
    pub price_usd: u64,
    #[serde(rename = "priceZAR")]
    pub price_zar: u64,
    pub features: Vec<String>,
    #[serde(default)]
    pub is_recommended: bool,
    pub cta: String,
}

impl PricingTier {
    /// Whole-unit list price in `currency`.
    pub fn price_in(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Zar => self.price_zar,
            Currency::Usd => self.price_usd,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCode {
    pub code: String,
    /// 0-100.
    pub discount_percent: u8,
    /// Who issued the code.
    pub assigned_by: String,
    pub is_active: bool,
}

impl ReferralCode {
    pub fn new(code: &str, discount_percent: u8, assigned_by: &str) -> Self {
        Self {
            code: normalize_code(code),
            discount_percent: discount_percent.min(100),
            assigned_by: assigned_by.to_string(),
            is_active: true,
        }
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Reference table of referral codes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferralTable {
    codes: Vec<ReferralCode>,
}

impl ReferralTable {
    pub fn new(codes: Vec<ReferralCode>) -> Self {
        Self { codes }
    }

    /// Exact, case-insensitive match against active codes only.
    pub fn lookup(&self, code: &str) -> Option<&ReferralCode> {
        let normalized = normalize_code(code);
        self.codes
            .iter()
            .find(|rc| rc.is_active && rc.code == normalized)
    }

    pub fn codes(&self) -> &[ReferralCode] {
        &self.codes
    }

    /// Insert a code, replacing any existing entry with the same code.
    pub fn upsert(&mut self, code: ReferralCode) {
        match self.codes.iter_mut().find(|rc| rc.code == code.code) {
            Some(existing) => *existing = code,
            None => self.codes.push(code),
        }
    }

    /// Mark a code inactive. Returns `false` if the code is unknown.
    pub fn deactivate(&mut self, code: &str) -> bool {
        let normalized = normalize_code(code);
        match self.codes.iter_mut().find(|rc| rc.code == normalized) {
            Some(rc) => {
                rc.is_active = false;
                true
            }
            None => false,
        }
    }
}

/// Apply a percentage discount and floor to whole units.
pub fn discounted_price(price: u64, discount_percent: u8) -> u64 {
    let percent = u64::from(discount_percent.min(100));
    // Integer form of floor(price * (1 - percent / 100)).
    price * (100 - percent) / 100
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    Details,
    Processing,
    Success,
}

/// Card form as typed into the (simulated) inline payment form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    pub expiry: String,
    pub cvc: String,
}

impl CardDetails {
    pub fn is_complete(&self) -> bool {
        !self.card_number.trim().is_empty()
            && !self.expiry.trim().is_empty()
            && !self.cvc.trim().is_empty()
    }
}

/// Checkout for one pricing tier.
///
/// At most one referral discount is active; applying a new code replaces
/// the previous one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    tier: PricingTier,
    currency: Currency,
    referral_input: String,
    applied: Option<ReferralCode>,
    discount_message: Option<String>,
    discount_error: Option<String>,
    card: CardDetails,
    step: CheckoutStep,
    payment_error: Option<String>,
}

impl Checkout {
    pub fn new(tier: PricingTier, currency: Currency) -> Self {
        Self {
            tier,
            currency,
            referral_input: String::new(),
            applied: None,
            discount_message: None,
            discount_error: None,
            card: CardDetails::default(),
            step: CheckoutStep::Details,
            payment_error: None,
        }
    }

    pub fn tier(&self) -> &PricingTier {
        &self.tier
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn card(&self) -> &CardDetails {
        &self.card
    }

    pub fn applied(&self) -> Option<&ReferralCode> {
        self.applied.as_ref()
    }

    pub fn discount_message(&self) -> Option<&str> {
        self.discount_message.as_deref()
    }

    pub fn discount_error(&self) -> Option<&str> {
        self.discount_error.as_deref()
    }

    pub fn payment_error(&self) -> Option<&str> {
        self.payment_error.as_deref()
    }

    pub fn discount_percent(&self) -> u8 {
        self.applied.as_ref().map_or(0, |rc| rc.discount_percent)
    }

    pub fn original_price(&self) -> u64 {
        self.tier.price_in(self.currency)
    }

    pub fn final_price(&self) -> u64 {
        discounted_price(self.original_price(), self.discount_percent())
    }

    /// Amount handed to the gateway, in cents.
    pub fn amount_minor_units(&self) -> u64 {
        self.final_price() * 100
    }

    /// Code forwarded with the charge, only while it actually discounts.
    pub fn charge_referral(&self) -> Option<String> {
        match &self.applied {
            Some(rc) if rc.discount_percent > 0 => Some(rc.code.clone()),
            _ => None,
        }
    }

    /// Referral and card edits are only accepted on the details step.
    fn ensure_details(&self) -> Result<(), PaymentError> {
        match self.step {
            CheckoutStep::Details => Ok(()),
            CheckoutStep::Processing => Err(PaymentError::AlreadyProcessing),
            CheckoutStep::Success => Err(PaymentError::AlreadyCompleted),
        }
    }

    /// Try to apply `code` against `table`. Blank input is ignored.
    pub fn apply_code(&mut self, code: &str, table: &ReferralTable) -> Result<bool, PaymentError> {
        let found = table.lookup(code).cloned();
        self.apply_lookup(code, found)
    }

    /// Record the result of looking `code` up elsewhere.
    ///
    /// A miss clears any prior discount and leaves an error message on the
    /// checkout; it never fails the checkout itself.
    pub fn apply_lookup(
        &mut self,
        code: &str,
        found: Option<ReferralCode>,
    ) -> Result<bool, PaymentError> {
        self.ensure_details()?;
        if code.trim().is_empty() {
            return Ok(false);
        }

        self.referral_input = code.to_string();
        self.discount_error = None;
        self.discount_message = None;

        match found {
            Some(rc) => {
                self.discount_message =
                    Some(format!("Success! {}% discount applied.", rc.discount_percent));
                self.applied = Some(rc);
                Ok(true)
            }
            None => {
                self.applied = None;
                self.discount_error = Some(REFERRAL_INVALID.to_string());
                Ok(false)
            }
        }
    }

    pub fn remove_code(&mut self) -> Result<(), PaymentError> {
        self.ensure_details()?;
        self.applied = None;
        self.referral_input.clear();
        self.discount_message = None;
        self.discount_error = None;
        Ok(())
    }

    pub fn set_card(&mut self, card: CardDetails) -> Result<(), PaymentError> {
        self.ensure_details()?;
        self.card = card;
        Ok(())
    }

    /// Move to `Processing`. Fails if a charge is in flight or done.
    pub fn begin_payment(&mut self) -> Result<(), PaymentError> {
        self.ensure_details()?;
        self.step = CheckoutStep::Processing;
        self.payment_error = None;
        Ok(())
    }

    pub fn payment_succeeded(&mut self) {
        self.step = CheckoutStep::Success;
        self.payment_error = None;
    }

    /// Back to the form with a retry prompt; entered details are kept.
    pub fn payment_failed(&mut self) {
        self.step = CheckoutStep::Details;
        self.payment_error = Some(PAYMENT_RETRY_PROMPT.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{pricing_tiers, referral_codes};

    fn basic() -> PricingTier {
        pricing_tiers().into_iter().next().unwrap()
    }

    fn table() -> ReferralTable {
        ReferralTable::new(referral_codes())
    }

    #[test]
    fn test_referral_discount_zar() {
        let mut checkout = Checkout::new(basic(), Currency::Zar);
        assert_eq!(checkout.final_price(), 1997);
        assert!(checkout.apply_code("JMDEV20", &table()).unwrap());
        assert_eq!(checkout.final_price(), 1597);
        assert_eq!(checkout.amount_minor_units(), 159_700);
        assert_eq!(checkout.discount_message(), Some("Success! 20% discount applied."));
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_trimmed() {
        assert!(table().lookup("  jmdev20 ").is_some());
        assert!(table().lookup("JMDEV2").is_none());
    }

    #[test]
    fn test_unknown_code_leaves_price() {
        let mut checkout = Checkout::new(basic(), Currency::Usd);
        assert!(!checkout.apply_code("NOPE", &table()).unwrap());
        assert_eq!(checkout.final_price(), 147);
        assert!(!checkout.discount_error().unwrap().is_empty());
        assert!(checkout.charge_referral().is_none());
    }

    #[test]
    fn test_invalid_code_clears_prior_discount() {
        let mut checkout = Checkout::new(basic(), Currency::Zar);
        checkout.apply_code("DCCSA15", &table()).unwrap();
        checkout.apply_code("BOGUS", &table()).unwrap();
        assert_eq!(checkout.final_price(), 1997);
    }

    #[test]
    fn test_codes_replace_not_stack() {
        let mut checkout = Checkout::new(basic(), Currency::Zar);
        checkout.apply_code("JMDEV20", &table()).unwrap();
        checkout.apply_code("EARLYBIRD", &table()).unwrap();
        assert_eq!(checkout.discount_percent(), 10);
        assert_eq!(checkout.final_price(), 1797);
    }

    #[test]
    fn test_remove_restores_original_price() {
        let mut checkout = Checkout::new(basic(), Currency::Usd);
        checkout.apply_code("DCCSA15", &table()).unwrap();
        assert_eq!(checkout.final_price(), 124); // floor(147 * 0.85)
        checkout.remove_code().unwrap();
        assert_eq!(checkout.final_price(), checkout.original_price());
        assert!(checkout.discount_message().is_none());
    }

    #[test]
    fn test_blank_code_is_noop() {
        let mut checkout = Checkout::new(basic(), Currency::Zar);
        checkout.apply_code("JMDEV20", &table()).unwrap();
        assert!(!checkout.apply_code("   ", &table()).unwrap());
        assert_eq!(checkout.discount_percent(), 20);
    }

    #[test]
    fn test_inactive_code_rejected() {
        let mut table = table();
        assert!(table.deactivate("earlybird"));
        assert!(table.lookup("EARLYBIRD").is_none());
        assert!(!table.deactivate("MISSING"));
    }

    #[test]
    fn test_full_discount_floors_to_zero() {
        let mut checkout = Checkout::new(basic(), Currency::Zar);
        checkout.apply_code("ADMIN100", &table()).unwrap();
        assert_eq!(checkout.final_price(), 0);
        assert_eq!(checkout.charge_referral().as_deref(), Some("ADMIN100"));
    }

    #[test]
    fn test_failed_payment_keeps_form() {
        let mut checkout = Checkout::new(basic(), Currency::Zar);
        let card = CardDetails {
            card_number: "4111 1111 1111 1111".into(),
            expiry: "12/29".into(),
            cvc: "123".into(),
        };
        checkout.set_card(card.clone()).unwrap();
        checkout.apply_code("JMDEV20", &table()).unwrap();

        checkout.begin_payment().unwrap();
        assert_eq!(checkout.begin_payment(), Err(PaymentError::AlreadyProcessing));
        checkout.payment_failed();

        assert_eq!(checkout.step(), CheckoutStep::Details);
        assert_eq!(checkout.card(), &card);
        assert_eq!(checkout.final_price(), 1597);
        assert!(checkout.payment_error().is_some());

        checkout.begin_payment().unwrap();
        checkout.payment_succeeded();
        assert_eq!(checkout.begin_payment(), Err(PaymentError::AlreadyCompleted));
    }

    #[test]
    fn test_paid_checkout_is_frozen() {
        let mut checkout = Checkout::new(basic(), Currency::Zar);
        checkout.begin_payment().unwrap();
        assert_eq!(
            checkout.apply_code("ADMIN100", &table()),
            Err(PaymentError::AlreadyProcessing)
        );

        checkout.payment_succeeded();
        assert_eq!(
            checkout.apply_code("ADMIN100", &table()),
            Err(PaymentError::AlreadyCompleted)
        );
        assert_eq!(checkout.remove_code(), Err(PaymentError::AlreadyCompleted));
        assert_eq!(
            checkout.set_card(CardDetails::default()),
            Err(PaymentError::AlreadyCompleted)
        );
        assert_eq!(checkout.final_price(), 1997);
        assert!(checkout.applied().is_none());
    }

    #[test]
    fn test_lookup_from_gateway() {
        let mut checkout = Checkout::new(basic(), Currency::Zar);
        let found = Some(ReferralCode::new("partner30", 30, "Gateway"));
        assert!(checkout.apply_lookup("partner30", found).unwrap());
        assert_eq!(checkout.final_price(), 1397);
        assert!(!checkout.apply_lookup("partner30", None).unwrap());
        assert_eq!(checkout.final_price(), 1997);
    }

    #[test]
    fn test_discounted_price_floors() {
        assert_eq!(discounted_price(3997, 15), 3397); // 3397.45
        assert_eq!(discounted_price(297, 10), 267); // 267.3
        assert_eq!(discounted_price(100, 0), 100);
    }
}
