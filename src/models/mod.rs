//! Data models for the ledger services
//!
//! Each model is either a stored record or the output of a service
//! operation, serialized as the dashboard expects it.

pub mod auth;
pub mod balance;
pub mod contact;
pub mod withdrawal;

// Re-export commonly used types for convenience
pub use auth::Principal;
pub use balance::{BalanceRecord, BalanceResult, Token};
pub use contact::{BindResult, BindTelegramRequest, MobileNumberRequest};
pub use withdrawal::{
    WithdrawRequest, WithdrawResult, WithdrawalHistory, WithdrawalRecord, WithdrawalStatus,
};
