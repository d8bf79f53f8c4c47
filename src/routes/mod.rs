//! HTTP surface of the ledger.
//!
//! Handlers only unpack the request; everything else lives in `services`.

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::services::permission_service;
use crate::state::SharedState;
use crate::utils::LedgerError;

pub mod balance;
pub mod telegram;
pub mod withdraw;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/withdraw", post(withdraw::withdraw))
        .route("/withdrawals/:wallet", get(withdraw::history))
        .route("/balance/:wallet", get(balance::get_balance))
        .route("/balance/:wallet/sync", post(balance::sync_balance))
        .route("/balance/:wallet/mobile", put(telegram::register_mobile))
        .route("/telegram/bind", post(telegram::bind_chat))
        .layer(cors())
        .with_state(state)
}

/// The dashboard calls from its own origin with the Supabase client headers
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ]))
        .max_age(Duration::from_secs(86400))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Successful body: `{"success": true, ...fields}`
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Bearer token from the `Authorization` header, if well formed
pub(crate) fn bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok();
    permission_service::bearer_token(value)
}

impl LedgerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Unauthorized => StatusCode::UNAUTHORIZED,
            LedgerError::MissingParameter
            | LedgerError::InvalidAddress
            | LedgerError::InvalidUnit
            | LedgerError::InvalidAmount
            | LedgerError::PrecisionExceeded(_)
            | LedgerError::InvalidMobile => StatusCode::BAD_REQUEST,
            LedgerError::NotFound => StatusCode::NOT_FOUND,
            LedgerError::InsufficientBalance => StatusCode::CONFLICT,
            LedgerError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            LedgerError::OracleUnavailable => StatusCode::BAD_GATEWAY,
            LedgerError::StoreWriteFailure | LedgerError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "reason": self.reason(),
            "error": self.to_string(),
        }));
        let mut response = (self.status_code(), body).into_response();

        if let LedgerError::RateLimited(seconds) = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::http::{header, HeaderMap, HeaderValue};
    use axum::response::Response;

    pub fn auth_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).unwrap();
        headers.insert(header::AUTHORIZATION, value);
        headers
    }

    pub async fn json_body(response: Response) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
