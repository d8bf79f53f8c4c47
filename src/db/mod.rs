use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::mysql::MySqlPool;
use thiserror::Error;

use crate::models::{BalanceRecord, Token, WithdrawalRecord};
use crate::utils::CryptoError;

pub mod balance;
pub mod memory;
pub mod withdrawal;

pub use balance::MySqlBalanceStore;
pub use memory::{MemoryBalanceStore, MemoryLedgerStore};
pub use withdrawal::MySqlLedgerStore;

const MIGRATIONS: &str = "migrations/create_tables.sql";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Contact encryption error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("Corrupt row: {0}")]
    Corrupt(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Balance records keyed by (wallet address, owning user)
#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn find(&self, wallet_address: &str, user_id: &str)
        -> Result<Option<BalanceRecord>, StoreError>;

    /// Fetch the record, creating it with zero balances on first reference
    async fn get_or_create(&self, wallet_address: &str, user_id: &str)
        -> Result<BalanceRecord, StoreError>;

    /// Subtract `amount` only if the current balance covers it, in one step.
    /// Returns the new balance, or `None` when the row is missing or short.
    async fn debit(
        &self,
        wallet_address: &str,
        user_id: &str,
        token: Token,
        amount: Decimal,
    ) -> Result<Option<Decimal>, StoreError>;

    /// Absolute-set the native balance (balance sync)
    async fn set_sol_balance(&self, wallet_address: &str, user_id: &str, balance: Decimal)
        -> Result<BalanceRecord, StoreError>;

    async fn set_mobile_number(&self, wallet_address: &str, user_id: &str, mobile_number: &str)
        -> Result<(), StoreError>;

    /// Attach a Telegram chat to every record registered with `mobile_number`.
    /// Returns how many records were bound.
    async fn bind_telegram_chat(&self, mobile_number: &str, chat_id: &str)
        -> Result<u64, StoreError>;
}

/// Append-only withdrawal ledger
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append(&self, record: &WithdrawalRecord) -> Result<(), StoreError>;

    /// Newest first
    async fn recent(&self, wallet_address: &str, user_id: &str, limit: u32)
        -> Result<Vec<WithdrawalRecord>, StoreError>;
}

/// Initialize the MySQL connection pool and create tables
pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPool::connect(database_url).await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Execute each `;`-terminated statement of a SQL file
async fn execute_sql_file(pool: &MySqlPool, file_path: &str) -> Result<(), sqlx::Error> {
    let sql_content = std::fs::read_to_string(file_path)?;

    for statement in sql_content.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::raw_sql(trimmed).execute(pool).await?;
        }
    }

    Ok(())
}

async fn create_tables(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    execute_sql_file(pool, MIGRATIONS).await?;
    tracing::info!("Applied {}", MIGRATIONS);
    Ok(())
}
