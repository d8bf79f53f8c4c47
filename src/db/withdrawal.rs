use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::Row;

use super::{LedgerStore, StoreError};
use crate::models::{Token, WithdrawalRecord, WithdrawalStatus};
use crate::utils::{decrypt_contact, encrypt_contact};

/// MySQL-backed withdrawal ledger. Mobile numbers are encrypted at rest.
pub struct MySqlLedgerStore {
    pool: MySqlPool,
    contact_key: String,
}

impl MySqlLedgerStore {
    pub fn new(pool: MySqlPool, contact_key: String) -> Self {
        Self { pool, contact_key }
    }

    fn record_from_row(&self, row: &MySqlRow) -> Result<WithdrawalRecord, StoreError> {
        let token: String = row.try_get("token")?;
        let status: String = row.try_get("status")?;
        let mobile_number = row
            .try_get::<Option<String>, _>("mobile_number")?
            .map(|encrypted| decrypt_contact(&encrypted, &self.contact_key))
            .transpose()?;

        Ok(WithdrawalRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            wallet_address: row.try_get("wallet_address")?,
            amount: row.try_get::<Decimal, _>("amount")?,
            token: Token::parse(&token)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown token {}", token)))?,
            signature: row.try_get("tx_signature")?,
            mobile_number,
            status: WithdrawalStatus::parse(&status)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown status {}", status)))?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl LedgerStore for MySqlLedgerStore {
    async fn append(&self, record: &WithdrawalRecord) -> Result<(), StoreError> {
        let mobile_number = record
            .mobile_number
            .as_deref()
            .map(|mobile| encrypt_contact(mobile, &self.contact_key))
            .transpose()?;

        sqlx::query(
            "INSERT INTO withdrawals \
             (id, user_id, wallet_address, amount, token, tx_signature, mobile_number, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.wallet_address)
        .bind(record.amount)
        .bind(record.token.as_str())
        .bind(&record.signature)
        .bind(mobile_number)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(
        &self,
        wallet_address: &str,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<WithdrawalRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, user_id, wallet_address, amount, token, tx_signature, mobile_number, status, created_at \
             FROM withdrawals WHERE wallet_address = ? AND user_id = ? \
             ORDER BY created_at DESC LIMIT ?",
        )
        .bind(wallet_address)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| self.record_from_row(row)).collect()
    }
}
