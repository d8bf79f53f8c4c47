//! Contact binding models

use serde::{Deserialize, Serialize};

/// Body of a mobile number registration from the dashboard
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileNumberRequest {
    pub mobile_number: Option<String>,
}

/// Body sent by the companion Telegram bot on `/start <mobile>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindTelegramRequest {
    pub mobile_number: Option<String>,
    /// Telegram sends chat ids as integers; strings are accepted too
    pub chat_id: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BindResult {
    pub bound: u64,
}
