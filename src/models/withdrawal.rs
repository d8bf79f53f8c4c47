//! Withdrawal models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::Token;

/// Body of a withdrawal request as sent by the dashboard.
///
/// Every field is optional so that absent values surface as a
/// `MissingParameter` failure instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub wallet_address: Option<String>,
    /// Kept raw: the precision rule needs the literal the caller sent
    pub amount: Option<serde_json::Value>,
    pub token: Option<String>,
    pub mobile_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Completed,
}

impl WithdrawalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WithdrawalStatus::Completed => "completed",
        }
    }

    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "completed" => Some(WithdrawalStatus::Completed),
            _ => None,
        }
    }
}

/// Append-only ledger entry for an accepted withdrawal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecord {
    pub id: String,
    pub user_id: String,
    pub wallet_address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub token: Token,
    pub signature: String,
    #[serde(skip_serializing)]
    pub mobile_number: Option<String>,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
}

/// Result of an accepted withdrawal
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResult {
    pub signature: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub new_balance: Decimal,
}

/// Recent withdrawals for a wallet
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalHistory {
    pub withdrawals: Vec<WithdrawalRecord>,
}
