use serde_json::Value;
use tracing::{error, info};

use crate::models::{BindResult, BindTelegramRequest, MobileNumberRequest};
use crate::services::permission_service;
use crate::state::AppState;
use crate::utils::validation::{is_valid_mobile_number, is_valid_wallet_address};
use crate::utils::LedgerError;

/// Register the mobile number the Telegram bot will later match on
pub async fn register_mobile(
    state: &AppState,
    bearer: Option<&str>,
    wallet_address: &str,
    request: Option<MobileNumberRequest>,
) -> Result<(), LedgerError> {
    let principal = permission_service::authenticate(state, bearer).await?;

    if !is_valid_wallet_address(wallet_address) {
        return Err(LedgerError::InvalidAddress);
    }

    let mobile_number = request
        .and_then(|r| r.mobile_number)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or(LedgerError::MissingParameter)?;

    if !is_valid_mobile_number(&mobile_number) {
        return Err(LedgerError::InvalidMobile);
    }

    state
        .balances
        .set_mobile_number(wallet_address, &principal.user_id, &mobile_number)
        .await
        .map_err(|e| {
            error!("Failed to store mobile number for {}: {}", wallet_address, e);
            LedgerError::StoreWriteFailure
        })?;

    info!("Registered mobile number for {}", wallet_address);
    Ok(())
}

/// Chat ids are signed integers (groups are negative)
fn parse_chat_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_i64().map(|id| id.to_string()),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|id| id.to_string()),
        _ => None,
    }
}

/// Bind a Telegram chat to every balance record carrying the mobile number
pub async fn bind_chat(
    state: &AppState,
    bot_secret: Option<&str>,
    request: Option<BindTelegramRequest>,
) -> Result<BindResult, LedgerError> {
    permission_service::check_bot_secret(state, bot_secret)?;

    let request = request.unwrap_or_default();
    let mobile_number = request
        .mobile_number
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    let chat_id = request.chat_id.as_ref().and_then(parse_chat_id);

    let (Some(mobile_number), Some(chat_id)) = (mobile_number, chat_id) else {
        return Err(LedgerError::MissingParameter);
    };

    if !is_valid_mobile_number(&mobile_number) {
        return Err(LedgerError::InvalidMobile);
    }

    let bound = state
        .balances
        .bind_telegram_chat(&mobile_number, &chat_id)
        .await
        .map_err(|e| {
            error!("Error updating telegram_chat_id: {}", e);
            LedgerError::StoreWriteFailure
        })?;

    if bound == 0 {
        return Err(LedgerError::NotFound);
    }

    info!("Bound Telegram chat to {} balance record(s)", bound);
    Ok(BindResult { bound })
}
