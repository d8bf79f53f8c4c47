//! Balance models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two balance denominations a wallet can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    /// Native unit, 9 decimal places
    #[serde(rename = "SOL")]
    Sol,
    /// Stable unit, 6 decimal places
    #[serde(rename = "USDC")]
    Usdc,
}

impl Token {
    pub fn parse(ticker: &str) -> Option<Self> {
        match ticker {
            "SOL" => Some(Token::Sol),
            "USDC" => Some(Token::Usdc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Token::Sol => "SOL",
            Token::Usdc => "USDC",
        }
    }

    /// Maximum fractional digits an amount in this unit may carry
    pub fn max_decimals(self) -> u32 {
        match self {
            Token::Sol => 9,
            Token::Usdc => 6,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored balances for one (wallet address, user) pair
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceRecord {
    pub wallet_address: String,
    pub user_id: String,
    pub sol_balance: Decimal,
    pub usdc_balance: Decimal,
    pub mobile_number: Option<String>,
    /// Telegram chat bound through the bot; the withdrawal contact reference
    pub telegram_chat_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl BalanceRecord {
    /// Fresh record with zero balances
    pub fn empty(wallet_address: &str, user_id: &str) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            user_id: user_id.to_string(),
            sol_balance: Decimal::ZERO,
            usdc_balance: Decimal::ZERO,
            mobile_number: None,
            telegram_chat_id: None,
            updated_at: Utc::now(),
        }
    }

    pub fn balance_of(&self, token: Token) -> Decimal {
        match token {
            Token::Sol => self.sol_balance,
            Token::Usdc => self.usdc_balance,
        }
    }
}

/// Balance view returned to the dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    pub wallet_address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sol_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub usdc_balance: Decimal,
    pub telegram_bound: bool,
}

impl From<&BalanceRecord> for BalanceResult {
    fn from(record: &BalanceRecord) -> Self {
        Self {
            wallet_address: record.wallet_address.clone(),
            sol_balance: record.sol_balance,
            usdc_balance: record.usdc_balance,
            telegram_bound: record.telegram_chat_id.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_token_parse_is_exact() {
        assert_eq!(Token::parse("SOL"), Some(Token::Sol));
        assert_eq!(Token::parse("USDC"), Some(Token::Usdc));
        assert_eq!(Token::parse("sol"), None);
        assert_eq!(Token::parse("BTC"), None);
    }

    #[test]
    fn test_balance_of_selects_unit() {
        let mut record = BalanceRecord::empty("wallet", "user");
        record.sol_balance = dec!(2.5);
        record.usdc_balance = dec!(10);

        assert_eq!(record.balance_of(Token::Sol), dec!(2.5));
        assert_eq!(record.balance_of(Token::Usdc), dec!(10));
    }

    #[test]
    fn test_balance_result_serializes_numbers() {
        let mut record = BalanceRecord::empty("wallet", "user");
        record.sol_balance = dec!(1.5);
        let json = serde_json::to_value(BalanceResult::from(&record)).unwrap();

        assert_eq!(json["solBalance"], serde_json::json!(1.5));
        assert_eq!(json["usdcBalance"], serde_json::json!(0.0));
        assert_eq!(json["telegramBound"], serde_json::json!(false));
    }
}
