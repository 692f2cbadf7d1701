use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use skillsnexus_shared::session::{AuthProvider, UserContext};
use skillsnexus_shared::types::Currency;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SignInRequest {
    provider: AuthProvider,
    #[serde(default)]
    credential: Option<String>,
}

#[derive(Deserialize)]
pub struct CurrencyRequest {
    currency: String,
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<UserContext>, ServerError> {
    state
        .adapters
        .identity
        .sign_in(req.provider, req.credential.as_deref())
        .await?;
    Ok(Json(state.sync_session().await))
}

pub async fn sign_out(State(state): State<AppState>) -> Json<UserContext> {
    state.adapters.identity.sign_out().await;
    state.viewers.write().await.clear();
    Json(state.sync_session().await)
}

pub async fn session(State(state): State<AppState>) -> Json<UserContext> {
    Json(state.user.read().await.clone())
}

pub async fn set_currency(
    State(state): State<AppState>,
    Json(req): Json<CurrencyRequest>,
) -> Result<Json<UserContext>, ServerError> {
    let currency = Currency::from_code(&req.currency).ok_or_else(|| {
        ServerError::BadRequest(format!("Unsupported currency: {}", req.currency))
    })?;

    let mut user = state.user.write().await;
    user.currency = currency;
    info!(currency = currency.code(), "Currency switched");
    Ok(Json(user.clone()))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let router = build_router(test_state());

        let (status, body) = call(
            &router,
            "POST",
            "/auth/sign-in",
            Some(json!({ "provider": "facebook" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isAuthenticated"], true);
        assert_eq!(body["displayName"], "Thabo Mokoena (FB)");

        let (_, body) = call(&router, "POST", "/auth/sign-out", None).await;
        assert_eq!(body["isAuthenticated"], false);
        assert!(body.get("displayName").is_none());
    }

    #[tokio::test]
    async fn test_currency_survives_sign_in() {
        let router = build_router(test_state());

        let (status, body) = call(
            &router,
            "PUT",
            "/session/currency",
            Some(json!({ "currency": "usd" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currency"], "USD");

        sign_in(&router).await;
        let (_, body) = call(&router, "GET", "/session", None).await;
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["isAuthenticated"], true);
    }

    #[tokio::test]
    async fn test_unknown_currency_rejected() {
        let router = build_router(test_state());
        let (status, body) = call(
            &router,
            "PUT",
            "/session/currency",
            Some(json!({ "currency": "EUR" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("EUR"));
    }
}
