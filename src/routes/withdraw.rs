use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use super::{bearer, Success};
use crate::models::{WithdrawRequest, WithdrawResult, WithdrawalHistory};
use crate::services::withdraw_service;
use crate::state::SharedState;
use crate::utils::LedgerError;

pub async fn withdraw(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Json<Success<WithdrawResult>>, LedgerError> {
    let request = match body {
        Ok(Json(request)) => Some(request),
        Err(rejection) => {
            debug!("Unreadable withdraw body: {}", rejection);
            None
        }
    };

    let result = withdraw_service::execute_withdraw(&state, bearer(&headers), request).await?;
    Ok(Success::new(result))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    limit: Option<u32>,
}

pub async fn history(
    State(state): State<SharedState>,
    Path(wallet): Path<String>,
    params: Option<Query<HistoryParams>>,
    headers: HeaderMap,
) -> Result<Json<Success<WithdrawalHistory>>, LedgerError> {
    let limit = params.and_then(|Query(p)| p.limit);
    let history =
        withdraw_service::list_withdrawals(&state, bearer(&headers), &wallet, limit).await?;
    Ok(Success::new(history))
}
