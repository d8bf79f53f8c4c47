use thiserror::Error;

/// Request-level failures surfaced to callers.
///
/// Each variant maps to one reason code; lower-level errors are logged
/// where they occur and never carried into the response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Missing required parameters")]
    MissingParameter,
    #[error("Invalid wallet address format")]
    InvalidAddress,
    #[error("Invalid token type")]
    InvalidUnit,
    #[error("Invalid amount")]
    InvalidAmount,
    #[error("Amount exceeds maximum decimal precision for {0}")]
    PrecisionExceeded(&'static str),
    #[error("Invalid mobile number")]
    InvalidMobile,
    #[error("Wallet not found or not owned by user")]
    NotFound,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Too many requests, retry in {0} seconds")]
    RateLimited(u64),
    #[error("Failed to verify wallet balance")]
    OracleUnavailable,
    #[error("Failed to update balance")]
    StoreWriteFailure,
    #[error("Internal server error")]
    InternalError,
}

impl LedgerError {
    /// Stable reason code for the response body
    pub fn reason(&self) -> &'static str {
        match self {
            LedgerError::Unauthorized => "Unauthorized",
            LedgerError::MissingParameter => "MissingParameter",
            LedgerError::InvalidAddress => "InvalidAddress",
            LedgerError::InvalidUnit => "InvalidUnit",
            LedgerError::InvalidAmount => "InvalidAmount",
            LedgerError::PrecisionExceeded(_) => "PrecisionExceeded",
            LedgerError::InvalidMobile => "InvalidMobile",
            LedgerError::NotFound => "NotFound",
            LedgerError::InsufficientBalance => "InsufficientBalance",
            LedgerError::RateLimited(_) => "RateLimited",
            LedgerError::OracleUnavailable => "OracleUnavailable",
            LedgerError::StoreWriteFailure => "StoreWriteFailure",
            LedgerError::InternalError => "InternalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_no_internal_detail() {
        assert_eq!(
            LedgerError::PrecisionExceeded("USDC").to_string(),
            "Amount exceeds maximum decimal precision for USDC"
        );
        assert_eq!(LedgerError::StoreWriteFailure.to_string(), "Failed to update balance");
        assert_eq!(LedgerError::InsufficientBalance.reason(), "InsufficientBalance");
    }
}
