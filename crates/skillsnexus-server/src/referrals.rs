//! Referral-code registry shared by checkouts and the admin API.
//!
//! Wraps the reference [`ReferralTable`] behind an async lock so admin
//! edits become visible to the next checkout lookup.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use skillsnexus_shared::fixtures::referral_codes;
use skillsnexus_shared::pricing::{ReferralCode, ReferralTable};

#[derive(Clone)]
pub struct ReferralRegistry {
    table: Arc<RwLock<ReferralTable>>,
}

impl ReferralRegistry {
    pub fn new(table: ReferralTable) -> Self {
        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }

    /// Exact, case-insensitive lookup against active codes.
    pub async fn validate(&self, code: &str) -> Option<ReferralCode> {
        let table = self.table.read().await;
        let found = table.lookup(code).cloned();
        debug!(code = %code.trim(), valid = found.is_some(), "Referral lookup");
        found
    }

    pub async fn list(&self) -> Vec<ReferralCode> {
        self.table.read().await.codes().to_vec()
    }

    /// Issue (or re-issue) a code on behalf of `assigned_by`.
    pub async fn admin_add(&self, code: &str, discount_percent: u8, assigned_by: &str) -> ReferralCode {
        let code = ReferralCode::new(code, discount_percent, assigned_by);
        self.table.write().await.upsert(code.clone());
        info!(code = %code.code, discount = code.discount_percent, by = %assigned_by, "Referral code issued");
        code
    }

    /// Returns `false` if the code is unknown.
    pub async fn admin_deactivate(&self, code: &str) -> bool {
        let deactivated = self.table.write().await.deactivate(code);
        if deactivated {
            info!(code = %code.trim(), "Referral code deactivated");
        }
        deactivated
    }
}

impl Default for ReferralRegistry {
    fn default() -> Self {
        Self::new(ReferralTable::new(referral_codes()))
    }
}
