use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use skillsnexus_shared::error::{CatalogError, PartnerAccessError, PaymentError};

use crate::adapters::AdapterError;
use crate::quota::Generation;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    PartnerAccess(#[from] PartnerAccessError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("Sign in required")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Generation quota exceeded ({0:?}), try again later")]
    QuotaExceeded(Generation),

    #[error("Identity provider error: {0}")]
    Identity(#[from] AdapterError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Catalog(CatalogError::DuplicateId(_)) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            ServerError::Catalog(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::PartnerAccess(PartnerAccessError::NotLoggedIn) => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            ServerError::PartnerAccess(_) => (StatusCode::FORBIDDEN, self.to_string()),
            ServerError::Payment(PaymentError::NotInitialized) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            ServerError::Payment(
                PaymentError::AlreadyProcessing | PaymentError::AlreadyCompleted,
            ) => (StatusCode::CONFLICT, self.to_string()),
            ServerError::Payment(_) => (StatusCode::PAYMENT_REQUIRED, self.to_string()),
            ServerError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            ServerError::QuotaExceeded(_) => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ServerError::Identity(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
