use serde::{Deserialize, Serialize};

/// Request body for sendMessage
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'a str,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Clone, Deserialize)]
pub struct BotApiResponse {
    pub ok: bool,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<i64>,
}
