use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::{error_from_response, ApiError, BalanceOracle};

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct BalanceValue {
    value: u64,
}

/// Queries native balances over Solana JSON-RPC
pub struct SolanaRpcOracle {
    http_client: HttpClient,
    rpc_url: String,
}

impl SolanaRpcOracle {
    pub const DEFAULT_RPC_URL: &'static str = "https://api.mainnet-beta.solana.com";

    pub fn new(http_client: HttpClient, rpc_url: String) -> Self {
        Self { http_client, rpc_url }
    }
}

/// Convert lamports to whole SOL without rounding
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL)
}

#[async_trait]
impl BalanceOracle for SolanaRpcOracle {
    async fn sol_balance(&self, wallet_address: &str) -> Result<Decimal, ApiError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBalance",
            "params": [wallet_address, { "commitment": "confirmed" }],
        });

        let response = self.http_client.post(&self.rpc_url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let rpc: RpcResponse<BalanceValue> = response.json().await?;
        if let Some(err) = rpc.error {
            return Err(ApiError::Rpc { code: err.code, message: err.message });
        }

        rpc.result
            .map(|balance| lamports_to_sol(balance.value))
            .ok_or_else(|| ApiError::DeserializationError("getBalance returned no result".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lamports_to_sol() {
        assert_eq!(lamports_to_sol(2_500_000_000), dec!(2.5));
        assert_eq!(lamports_to_sol(1), dec!(0.000000001));
        assert_eq!(lamports_to_sol(0), Decimal::ZERO);
    }

    #[test]
    fn test_rpc_response_shapes() {
        let ok: RpcResponse<BalanceValue> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","result":{"context":{"slot":1},"value":42},"id":1}"#,
        )
        .unwrap();
        assert_eq!(ok.result.map(|b| b.value), Some(42));

        let failed: RpcResponse<BalanceValue> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid param"},"id":1}"#,
        )
        .unwrap();
        assert!(failed.result.is_none());
        assert_eq!(failed.error.map(|e| e.code), Some(-32602));
    }
}
