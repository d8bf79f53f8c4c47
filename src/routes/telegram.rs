use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::json;

use super::{bearer, Success};
use crate::models::{BindResult, BindTelegramRequest, MobileNumberRequest};
use crate::services::telegram_service;
use crate::state::SharedState;
use crate::utils::LedgerError;

pub const BOT_SECRET_HEADER: &str = "x-bot-secret";

pub async fn register_mobile(
    State(state): State<SharedState>,
    Path(wallet): Path<String>,
    headers: HeaderMap,
    body: Result<Json<MobileNumberRequest>, JsonRejection>,
) -> Result<Json<Success<serde_json::Value>>, LedgerError> {
    let request = body.ok().map(|Json(r)| r);
    telegram_service::register_mobile(&state, bearer(&headers), &wallet, request).await?;
    Ok(Success::new(json!({})))
}

pub async fn bind_chat(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<BindTelegramRequest>, JsonRejection>,
) -> Result<Json<Success<BindResult>>, LedgerError> {
    let secret = headers
        .get(BOT_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    let request = body.ok().map(|Json(r)| r);

    let result = telegram_service::bind_chat(&state, secret, request).await?;
    Ok(Success::new(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{auth_headers, json_body};
    use crate::testing::TestHarness;
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;

    const MOBILE: &str = "+447700900123";

    fn bot_headers(secret: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(BOT_SECRET_HEADER, HeaderValue::from_static(secret));
        headers
    }

    #[tokio::test]
    async fn test_register_and_bind_over_http() {
        let harness = TestHarness::new();

        let response = register_mobile(
            State(harness.state.clone()),
            Path(TestHarness::WALLET.to_string()),
            auth_headers(TestHarness::TOKEN),
            Ok(Json(MobileNumberRequest {
                mobile_number: Some(MOBILE.to_string()),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "success": true }));

        let response = bind_chat(
            State(harness.state.clone()),
            bot_headers(TestHarness::BOT_SECRET),
            Ok(Json(BindTelegramRequest {
                mobile_number: Some(MOBILE.to_string()),
                chat_id: Some(json!(5550001)),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["bound"], 1);
    }

    #[tokio::test]
    async fn test_bind_with_wrong_secret() {
        let harness = TestHarness::new();

        let response = bind_chat(
            State(harness.state.clone()),
            bot_headers("guess"),
            Ok(Json(BindTelegramRequest {
                mobile_number: Some(MOBILE.to_string()),
                chat_id: Some(json!(1)),
            })),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
