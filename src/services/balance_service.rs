use tracing::{error, info, warn};

use crate::models::BalanceResult;
use crate::services::permission_service;
use crate::state::AppState;
use crate::utils::validation::is_valid_wallet_address;
use crate::utils::LedgerError;

const SYNC_ACTION: &str = "balance_sync";

/// Current balances for a wallet, creating a zero record on first reference
pub async fn get_balance(
    state: &AppState,
    bearer: Option<&str>,
    wallet_address: &str,
) -> Result<BalanceResult, LedgerError> {
    let principal = permission_service::authenticate(state, bearer).await?;

    if !is_valid_wallet_address(wallet_address) {
        return Err(LedgerError::InvalidAddress);
    }

    let record = state
        .balances
        .get_or_create(wallet_address, &principal.user_id)
        .await
        .map_err(|e| {
            error!("Failed to load balance for {}: {}", wallet_address, e);
            LedgerError::StoreWriteFailure
        })?;

    Ok(BalanceResult::from(&record))
}

/// Overwrite the stored native balance with the on-chain value
pub async fn sync_balance(
    state: &AppState,
    bearer: Option<&str>,
    wallet_address: &str,
) -> Result<BalanceResult, LedgerError> {
    let principal = permission_service::authenticate(state, bearer).await?;

    if !is_valid_wallet_address(wallet_address) {
        return Err(LedgerError::InvalidAddress);
    }

    state
        .cooldowns
        .check(&principal.user_id, SYNC_ACTION)
        .await
        .map_err(LedgerError::RateLimited)?;

    let oracle = state.oracle.as_ref().ok_or_else(|| {
        warn!("Balance sync requested but no RPC endpoint is configured");
        LedgerError::OracleUnavailable
    })?;

    let onchain = oracle.sol_balance(wallet_address).await.map_err(|e| {
        warn!("Failed to fetch on-chain balance for {}: {}", wallet_address, e);
        LedgerError::OracleUnavailable
    })?;

    let record = state
        .balances
        .set_sol_balance(wallet_address, &principal.user_id, onchain)
        .await
        .map_err(|e| {
            error!("Failed to store synced balance for {}: {}", wallet_address, e);
            LedgerError::StoreWriteFailure
        })?;

    info!("Synced {} to {} SOL", wallet_address, onchain);

    Ok(BalanceResult::from(&record))
}
