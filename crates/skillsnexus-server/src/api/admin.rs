//! Bearer-token admin endpoints for referral codes.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use skillsnexus_shared::pricing::ReferralCode;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusResponse {
    name: String,
    uptime_secs: u64,
    courses: usize,
    open_viewers: usize,
    open_checkouts: usize,
    referral_codes: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReferralRequest {
    code: String,
    discount_percent: u8,
    #[serde(default)]
    assigned_by: Option<String>,
}

#[derive(Deserialize)]
pub struct DeactivateReferralRequest {
    code: String,
}

/// Admits a request only when it carries the configured bearer token.
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let expected = state.config.admin_token.as_deref().ok_or_else(|| {
            ServerError::Forbidden("Admin API is disabled (no ADMIN_TOKEN configured)".into())
        })?;

        match bearer_token(&parts.headers) {
            Some(presented) if tokens_match(presented, expected) => Ok(AdminAuth),
            _ => {
                warn!(path = %parts.uri.path(), "Rejected admin request");
                Err(ServerError::Forbidden("Invalid admin token".into()))
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Constant time; slices of different length never match.
fn tokens_match(presented: &str, expected: &str) -> bool {
    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

pub async fn status(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<AdminStatusResponse>, ServerError> {
    Ok(Json(AdminStatusResponse {
        name: state.config.instance_name.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        courses: state.catalog.read().await.len(),
        open_viewers: state.viewers.read().await.len(),
        open_checkouts: state.checkouts.len().await,
        referral_codes: state.referrals.list().await.len(),
    }))
}

pub async fn add_referral(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(req): Json<AddReferralRequest>,
) -> Result<Json<ReferralCode>, ServerError> {
    if req.code.trim().is_empty() {
        return Err(ServerError::BadRequest("Referral code is empty".into()));
    }
    if req.discount_percent > 100 {
        return Err(ServerError::BadRequest(format!(
            "Discount must be 0-100, got {}",
            req.discount_percent
        )));
    }

    let assigned_by = req.assigned_by.as_deref().unwrap_or("Admin");
    let code = state
        .referrals
        .admin_add(&req.code, req.discount_percent, assigned_by)
        .await;
    Ok(Json(code))
}

pub async fn deactivate_referral(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(req): Json<DeactivateReferralRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if !state.referrals.admin_deactivate(&req.code).await {
        return Err(ServerError::NotFound(format!("referral code {}", req.code.trim())));
    }
    info!(code = %req.code.trim(), "Admin deactivated referral code");
    Ok(Json(serde_json::json!({ "deactivated": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    const AUTH: &[(&str, &str)] = &[("authorization", "Bearer admin-secret")];

    #[test]
    fn test_bearer_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer abc ".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
    }

    #[test]
    fn test_token_comparison() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abd", "abc"));
        assert!(!tokens_match("ab", "abc"));
        assert!(!tokens_match("", "abc"));
    }

    #[tokio::test]
    async fn test_admin_disabled_without_token() {
        let mut state = test_state();
        let mut config = (*state.config).clone();
        config.admin_token = None;
        state.config = std::sync::Arc::new(config);
        let router = build_router(state);

        let (status, body) = call_with_headers(&router, "GET", "/admin/status", None, AUTH).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].as_str().unwrap().contains("disabled"));
    }

    #[tokio::test]
    async fn test_status_needs_token() {
        let router = build_router(test_state());
        let (status, _) = call(&router, "GET", "/admin/status", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call_with_headers(&router, "GET", "/admin/status", None, AUTH).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["courses"], 5);
        assert_eq!(body["referralCodes"], 4);
    }

    #[tokio::test]
    async fn test_issued_code_applies_at_checkout() {
        let router = build_router(test_state());
        let (status, body) = call_with_headers(
            &router,
            "POST",
            "/admin/referrals",
            Some(json!({ "code": "ubuntu50", "discountPercent": 50 })),
            AUTH,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "UBUNTU50");
        assert_eq!(body["assignedBy"], "Admin");

        let (_, checkout) = call(&router, "POST", "/checkout", Some(json!({ "tierId": "basic_tier" }))).await;
        let id = checkout["checkoutId"].as_str().unwrap();
        let (_, body) = call(
            &router,
            "POST",
            &format!("/checkouts/{id}/referral"),
            Some(json!({ "code": "UBUNTU50" })),
        )
        .await;
        assert_eq!(body["finalPrice"], 998);
    }

    #[tokio::test]
    async fn test_deactivated_code_rejected() {
        let router = build_router(test_state());
        let (status, _) = call_with_headers(
            &router,
            "POST",
            "/admin/referrals/deactivate",
            Some(json!({ "code": "jmdev20" })),
            AUTH,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, checkout) = call(&router, "POST", "/checkout", Some(json!({ "tierId": "basic_tier" }))).await;
        let id = checkout["checkoutId"].as_str().unwrap();
        let (_, body) = call(
            &router,
            "POST",
            &format!("/checkouts/{id}/referral"),
            Some(json!({ "code": "JMDEV20" })),
        )
        .await;
        assert_eq!(body["finalPrice"], 1997);
        assert!(body["discountError"].is_string());

        let (status, _) = call_with_headers(
            &router,
            "POST",
            "/admin/referrals/deactivate",
            Some(json!({ "code": "missing" })),
            AUTH,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
