use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::Row;

use super::{BalanceStore, StoreError};
use crate::models::{BalanceRecord, Token};
use crate::utils::{decrypt_contact, encrypt_contact};

const SELECT_BALANCE: &str = "SELECT wallet_address, user_id, sol_balance, usdc_balance, \
     mobile_number, telegram_chat_id, updated_at FROM balances \
     WHERE wallet_address = ? AND user_id = ?";

/// MySQL-backed balance records. Telegram chat ids are encrypted at rest.
pub struct MySqlBalanceStore {
    pool: MySqlPool,
    contact_key: String,
}

impl MySqlBalanceStore {
    pub fn new(pool: MySqlPool, contact_key: String) -> Self {
        Self { pool, contact_key }
    }

    fn record_from_row(&self, row: &MySqlRow) -> Result<BalanceRecord, StoreError> {
        let telegram_chat_id = row
            .try_get::<Option<String>, _>("telegram_chat_id")?
            .map(|encrypted| decrypt_contact(&encrypted, &self.contact_key))
            .transpose()?;

        Ok(BalanceRecord {
            wallet_address: row.try_get("wallet_address")?,
            user_id: row.try_get("user_id")?,
            sol_balance: row.try_get::<Decimal, _>("sol_balance")?,
            usdc_balance: row.try_get::<Decimal, _>("usdc_balance")?,
            mobile_number: row.try_get("mobile_number")?,
            telegram_chat_id,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }

    fn balance_column(token: Token) -> &'static str {
        match token {
            Token::Sol => "sol_balance",
            Token::Usdc => "usdc_balance",
        }
    }
}

#[async_trait]
impl BalanceStore for MySqlBalanceStore {
    async fn find(
        &self,
        wallet_address: &str,
        user_id: &str,
    ) -> Result<Option<BalanceRecord>, StoreError> {
        let row = sqlx::query(SELECT_BALANCE)
            .bind(wallet_address)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| self.record_from_row(&r)).transpose()
    }

    async fn get_or_create(
        &self,
        wallet_address: &str,
        user_id: &str,
    ) -> Result<BalanceRecord, StoreError> {
        sqlx::query("INSERT IGNORE INTO balances (wallet_address, user_id) VALUES (?, ?)")
            .bind(wallet_address)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        self.find(wallet_address, user_id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("balance row vanished for {}", wallet_address)))
    }

    async fn debit(
        &self,
        wallet_address: &str,
        user_id: &str,
        token: Token,
        amount: Decimal,
    ) -> Result<Option<Decimal>, StoreError> {
        let column = Self::balance_column(token);
        let mut tx = self.pool.begin().await?;

        // Conditional update: two racing debits cannot both pass the check
        let rows_affected = sqlx::query(&format!(
            "UPDATE balances SET {col} = {col} - ? WHERE wallet_address = ? AND user_id = ? AND {col} >= ?",
            col = column
        ))
        .bind(amount)
        .bind(wallet_address)
        .bind(user_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let new_balance: Decimal = sqlx::query_scalar(&format!(
            "SELECT {} FROM balances WHERE wallet_address = ? AND user_id = ?",
            column
        ))
        .bind(wallet_address)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(new_balance))
    }

    async fn set_sol_balance(
        &self,
        wallet_address: &str,
        user_id: &str,
        balance: Decimal,
    ) -> Result<BalanceRecord, StoreError> {
        sqlx::query(
            "INSERT INTO balances (wallet_address, user_id, sol_balance) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE sol_balance = VALUES(sol_balance)",
        )
        .bind(wallet_address)
        .bind(user_id)
        .bind(balance)
        .execute(&self.pool)
        .await?;

        self.find(wallet_address, user_id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("balance row vanished for {}", wallet_address)))
    }

    async fn set_mobile_number(
        &self,
        wallet_address: &str,
        user_id: &str,
        mobile_number: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO balances (wallet_address, user_id, mobile_number) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE mobile_number = VALUES(mobile_number)",
        )
        .bind(wallet_address)
        .bind(user_id)
        .bind(mobile_number)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn bind_telegram_chat(
        &self,
        mobile_number: &str,
        chat_id: &str,
    ) -> Result<u64, StoreError> {
        let encrypted = encrypt_contact(chat_id, &self.contact_key)?;

        let result = sqlx::query("UPDATE balances SET telegram_chat_id = ? WHERE mobile_number = ?")
            .bind(encrypted)
            .bind(mobile_number)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
