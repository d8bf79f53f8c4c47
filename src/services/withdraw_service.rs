//! Withdrawal flow: validate, debit, record, notify.
//!
//! Validation is fail-fast in a fixed order and touches no store until the
//! request is known to be well-formed. The debit is a single conditional
//! store operation; the ledger append that follows is not atomic with it.
//! A failed append is logged as a security event and the debit stands.
//!
//! The confirmation reference is a local placeholder. No on-chain
//! transaction is built, signed or sent.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::api::telegram::format_withdrawal_message;
use crate::models::{
    BalanceRecord, Principal, Token, WithdrawRequest, WithdrawResult, WithdrawalHistory,
    WithdrawalRecord, WithdrawalStatus,
};
use crate::services::permission_service;
use crate::state::AppState;
use crate::utils::validation::{
    decimal_places, is_blank, is_valid_wallet_address, parse_amount, AmountError,
};
use crate::utils::{confirmation_reference, LedgerError};

/// Stored vs on-chain difference tolerated before logging a mismatch
const ONCHAIN_TOLERANCE_SOL: Decimal = dec!(0.001);
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_HISTORY_LIMIT: u32 = 10;
const MAX_HISTORY_LIMIT: u32 = 100;

/// A request that passed every stateless check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedWithdrawal {
    pub wallet_address: String,
    pub amount: Decimal,
    pub token: Token,
    pub mobile_number: Option<String>,
}

/// Stateless checks 2 to 6 of the withdrawal order
pub fn validate_request(request: WithdrawRequest) -> Result<ValidatedWithdrawal, LedgerError> {
    let wallet_address = request.wallet_address.filter(|w| !w.trim().is_empty());
    let ticker = request.token.filter(|t| !t.trim().is_empty());
    let amount_value = request.amount.filter(|a| !is_blank(Some(a)));

    let (Some(wallet_address), Some(amount_value), Some(ticker)) =
        (wallet_address, amount_value, ticker)
    else {
        return Err(LedgerError::MissingParameter);
    };

    if !is_valid_wallet_address(&wallet_address) {
        return Err(LedgerError::InvalidAddress);
    }

    let token = Token::parse(&ticker).ok_or(LedgerError::InvalidUnit)?;

    let amount = parse_amount(&amount_value).map_err(|e| match e {
        AmountError::ExcessPrecision(scale) if scale > token.max_decimals() => {
            LedgerError::PrecisionExceeded(token.as_str())
        }
        _ => LedgerError::InvalidAmount,
    })?;

    if decimal_places(amount) > token.max_decimals() {
        return Err(LedgerError::PrecisionExceeded(token.as_str()));
    }

    Ok(ValidatedWithdrawal {
        wallet_address,
        amount,
        token,
        mobile_number: request.mobile_number.filter(|m| !m.trim().is_empty()),
    })
}

/// Handle one withdrawal request end to end.
///
/// `request` is `None` when the body could not be parsed at all.
pub async fn execute_withdraw(
    state: &AppState,
    bearer: Option<&str>,
    request: Option<WithdrawRequest>,
) -> Result<WithdrawResult, LedgerError> {
    let principal = permission_service::authenticate(state, bearer).await?;
    let withdrawal = validate_request(request.unwrap_or_default())?;

    let record = state
        .balances
        .find(&withdrawal.wallet_address, &principal.user_id)
        .await
        .map_err(|e| {
            error!("Balance lookup failed for {}: {}", withdrawal.wallet_address, e);
            LedgerError::InternalError
        })?
        .ok_or(LedgerError::NotFound)?;

    if withdrawal.amount > record.balance_of(withdrawal.token) {
        return Err(LedgerError::InsufficientBalance);
    }

    cross_check_onchain(state, &record, withdrawal.token).await;

    let signature = confirmation_reference();

    let new_balance = match state
        .balances
        .debit(
            &withdrawal.wallet_address,
            &principal.user_id,
            withdrawal.token,
            withdrawal.amount,
        )
        .await
    {
        Ok(Some(balance)) => balance,
        Ok(None) => {
            // A concurrent debit got there first
            warn!(
                "Debit of {} {} on {} refused by store after balance check",
                withdrawal.amount, withdrawal.token, withdrawal.wallet_address
            );
            return Err(LedgerError::InsufficientBalance);
        }
        Err(e) => {
            error!("Balance update error on {}: {}", withdrawal.wallet_address, e);
            return Err(LedgerError::StoreWriteFailure);
        }
    };

    let ledger_entry = WithdrawalRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: principal.user_id.clone(),
        wallet_address: withdrawal.wallet_address.clone(),
        amount: withdrawal.amount,
        token: withdrawal.token,
        signature: signature.clone(),
        mobile_number: withdrawal.mobile_number.clone(),
        status: WithdrawalStatus::Completed,
        created_at: Utc::now(),
    };

    if let Err(e) = state.ledger.append(&ledger_entry).await {
        error!(
            user_id = %principal.user_id,
            wallet_address = %withdrawal.wallet_address,
            amount = %withdrawal.amount,
            token = %withdrawal.token,
            signature = %signature,
            "SECURITY_EVENT: failed to record withdrawal after debit: {}",
            e
        );
    }

    notify_withdrawal(state, &record, &ledger_entry).await;

    info!(
        "Withdrawal {} of {} {} from {} completed, new balance {}",
        ledger_entry.id, withdrawal.amount, withdrawal.token, withdrawal.wallet_address, new_balance
    );

    Ok(WithdrawResult {
        signature,
        new_balance,
    })
}

/// Compare the stored native balance with the chain. Advisory only.
async fn cross_check_onchain(state: &AppState, record: &BalanceRecord, token: Token) {
    let Some(oracle) = state.oracle.as_ref() else {
        return;
    };
    if token != Token::Sol {
        return;
    }

    match oracle.sol_balance(&record.wallet_address).await {
        Ok(onchain) => {
            if (onchain - record.sol_balance).abs() > ONCHAIN_TOLERANCE_SOL {
                warn!(
                    "Balance mismatch for {}: DB={}, Chain={}",
                    record.wallet_address, record.sol_balance, onchain
                );
            }
        }
        Err(e) => {
            warn!("Failed to verify on-chain balance for {}: {}", record.wallet_address, e);
        }
    }
}

/// Best-effort notification to the record's bound Telegram chat
async fn notify_withdrawal(state: &AppState, record: &BalanceRecord, entry: &WithdrawalRecord) {
    let (Some(notifier), Some(chat_id)) =
        (state.notifier.as_ref(), record.telegram_chat_id.as_deref())
    else {
        return;
    };

    let text = format_withdrawal_message(
        entry.amount,
        entry.token,
        &entry.wallet_address,
        &entry.signature,
    );

    match tokio::time::timeout(NOTIFY_TIMEOUT, notifier.notify(chat_id, &text)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Telegram notification error for {}: {}", entry.id, e),
        Err(_) => warn!("Telegram notification for {} timed out", entry.id),
    }
}

/// Most recent withdrawals for a wallet the caller owns
pub async fn list_withdrawals(
    state: &AppState,
    bearer: Option<&str>,
    wallet_address: &str,
    limit: Option<u32>,
) -> Result<WithdrawalHistory, LedgerError> {
    let principal: Principal = permission_service::authenticate(state, bearer).await?;

    if !is_valid_wallet_address(wallet_address) {
        return Err(LedgerError::InvalidAddress);
    }

    let owned = state
        .balances
        .find(wallet_address, &principal.user_id)
        .await
        .map_err(|e| {
            error!("Balance lookup failed for {}: {}", wallet_address, e);
            LedgerError::InternalError
        })?;
    if owned.is_none() {
        return Err(LedgerError::NotFound);
    }

    let limit = limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let withdrawals = state
        .ledger
        .recent(wallet_address, &principal.user_id, limit)
        .await
        .map_err(|e| {
            error!("Withdrawal history lookup failed for {}: {}", wallet_address, e);
            LedgerError::InternalError
        })?;

    Ok(WithdrawalHistory { withdrawals })
}
