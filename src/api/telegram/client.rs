use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{BotApiResponse, SendMessageRequest};
use crate::api::{ApiError, Notifier};
use crate::utils::rate_limit_telegram_api;

/// Telegram Bot API client used for withdrawal notifications
pub struct TelegramClient {
    http_client: HttpClient,
    bot_token: String,
    base_url: String,
}

impl TelegramClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.telegram.org";

    pub fn new(http_client: HttpClient, bot_token: String) -> Self {
        Self::with_base_url(http_client, bot_token, Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with custom base URL (for testing)
    pub fn with_base_url(http_client: HttpClient, bot_token: String, base_url: String) -> Self {
        Self {
            http_client,
            bot_token,
            base_url,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }

    /// Turn a Bot API failure envelope into an [`ApiError`]
    fn error_from_envelope(envelope: BotApiResponse) -> ApiError {
        let description = envelope.description.unwrap_or_default();
        match envelope.error_code {
            Some(429) => ApiError::RateLimited {
                retry_after: envelope
                    .parameters
                    .and_then(|p| p.retry_after)
                    .unwrap_or(1),
            },
            Some(400) => ApiError::BadRequest(description),
            Some(401) => ApiError::Unauthorized(description),
            Some(403) => ApiError::Forbidden(description),
            Some(404) => ApiError::NotFound(description),
            Some(code) if code >= 500 => ApiError::ServerError(code, description),
            Some(code) => ApiError::HttpError(code, description),
            None => ApiError::DeserializationError(description),
        }
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    /// POST /bot{token}/sendMessage
    async fn notify(&self, chat_id: &str, text: &str) -> Result<(), ApiError> {
        rate_limit_telegram_api().await;

        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "MarkdownV2",
        };

        let response = self
            .http_client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        // The Bot API reports failures in the JSON envelope as well as the status
        let envelope: BotApiResponse = response.json().await?;
        if !envelope.ok {
            let err = Self::error_from_envelope(envelope);
            warn!("Telegram sendMessage failed: {}", err);
            return Err(err);
        }

        debug!("Telegram notification delivered");
        Ok(())
    }
}
