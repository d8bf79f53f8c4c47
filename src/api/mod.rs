//! Clients for the external collaborators of the ledger: the auth
//! provider, the Solana RPC node and the Telegram Bot API.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use crate::models::Principal;

pub mod solana_rpc;
pub mod supabase;
pub mod telegram;

pub use solana_rpc::SolanaRpcOracle;
pub use supabase::SupabaseAuth;
pub use telegram::TelegramClient;

/// Error type shared by the outbound HTTP clients
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Rate Limited. Retry after {retry_after} s")]
    RateLimited { retry_after: i64 },
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
    #[error("RPC Error ({code}): {message}")]
    Rpc { code: i64, message: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::DeserializationError(e.to_string())
        } else {
            ApiError::RequestError(e.to_string())
        }
    }
}

/// Map a non-success HTTP response to an [`ApiError`]
pub(crate) async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok());
    let body_text = response.text().await.unwrap_or_default();

    match status {
        400 => ApiError::BadRequest(body_text),
        401 => ApiError::Unauthorized(body_text),
        403 => ApiError::Forbidden(body_text),
        404 => ApiError::NotFound(body_text),
        429 => {
            let retry_after = retry_after.unwrap_or(1);
            warn!("Rate limited, retry after {} s", retry_after);
            ApiError::RateLimited { retry_after }
        }
        500..=599 => {
            warn!("Server error {}: {}", status, body_text);
            ApiError::ServerError(status, body_text)
        }
        _ => ApiError::HttpError(status, body_text),
    }
}

/// Maps a bearer credential to a user identity
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// `Ok(None)` when the credential is rejected
    async fn resolve(&self, bearer: &str) -> Result<Option<Principal>, ApiError>;
}

/// Read-only on-chain balance lookup
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// Native balance of `wallet_address` in whole SOL
    async fn sol_balance(&self, wallet_address: &str) -> Result<Decimal, ApiError>;
}

/// Best-effort outbound messages keyed by a stored contact reference
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, chat_id: &str, text: &str) -> Result<(), ApiError>;
}
