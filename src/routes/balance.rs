use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use super::{bearer, Success};
use crate::models::BalanceResult;
use crate::services::balance_service;
use crate::state::SharedState;
use crate::utils::LedgerError;

pub async fn get_balance(
    State(state): State<SharedState>,
    Path(wallet): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Success<BalanceResult>>, LedgerError> {
    let balance = balance_service::get_balance(&state, bearer(&headers), &wallet).await?;
    Ok(Success::new(balance))
}

pub async fn sync_balance(
    State(state): State<SharedState>,
    Path(wallet): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Success<BalanceResult>>, LedgerError> {
    let balance = balance_service::sync_balance(&state, bearer(&headers), &wallet).await?;
    Ok(Success::new(balance))
}
