//! In-process stores used in demo mode (no `DATABASE_URL`) and by tests.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::{BalanceStore, LedgerStore, StoreError};
use crate::models::{BalanceRecord, Token, WithdrawalRecord};

type BalanceKey = (String, String);

#[derive(Default)]
pub struct MemoryBalanceStore {
    records: Mutex<HashMap<BalanceKey, BalanceRecord>>,
    operations: AtomicUsize,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record without counting it as a store operation
    pub async fn seed(&self, record: BalanceRecord) {
        let key = (record.wallet_address.clone(), record.user_id.clone());
        self.records.lock().await.insert(key, record);
    }

    pub async fn snapshot(&self, wallet_address: &str, user_id: &str) -> Option<BalanceRecord> {
        self.records
            .lock()
            .await
            .get(&(wallet_address.to_string(), user_id.to_string()))
            .cloned()
    }

    /// Number of trait calls served so far
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

fn key(wallet_address: &str, user_id: &str) -> BalanceKey {
    (wallet_address.to_string(), user_id.to_string())
}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn find(
        &self,
        wallet_address: &str,
        user_id: &str,
    ) -> Result<Option<BalanceRecord>, StoreError> {
        self.touch();
        Ok(self.records.lock().await.get(&key(wallet_address, user_id)).cloned())
    }

    async fn get_or_create(
        &self,
        wallet_address: &str,
        user_id: &str,
    ) -> Result<BalanceRecord, StoreError> {
        self.touch();
        let mut records = self.records.lock().await;
        let record = records
            .entry(key(wallet_address, user_id))
            .or_insert_with(|| BalanceRecord::empty(wallet_address, user_id));
        Ok(record.clone())
    }

    async fn debit(
        &self,
        wallet_address: &str,
        user_id: &str,
        token: Token,
        amount: Decimal,
    ) -> Result<Option<Decimal>, StoreError> {
        self.touch();
        let mut records = self.records.lock().await;
        let Some(record) = records.get_mut(&key(wallet_address, user_id)) else {
            return Ok(None);
        };

        let balance = match token {
            Token::Sol => &mut record.sol_balance,
            Token::Usdc => &mut record.usdc_balance,
        };
        if *balance < amount {
            return Ok(None);
        }

        *balance -= amount;
        let new_balance = *balance;
        record.updated_at = Utc::now();
        Ok(Some(new_balance))
    }

    async fn set_sol_balance(
        &self,
        wallet_address: &str,
        user_id: &str,
        balance: Decimal,
    ) -> Result<BalanceRecord, StoreError> {
        self.touch();
        let mut records = self.records.lock().await;
        let record = records
            .entry(key(wallet_address, user_id))
            .or_insert_with(|| BalanceRecord::empty(wallet_address, user_id));
        record.sol_balance = balance;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn set_mobile_number(
        &self,
        wallet_address: &str,
        user_id: &str,
        mobile_number: &str,
    ) -> Result<(), StoreError> {
        self.touch();
        let mut records = self.records.lock().await;
        let record = records
            .entry(key(wallet_address, user_id))
            .or_insert_with(|| BalanceRecord::empty(wallet_address, user_id));
        record.mobile_number = Some(mobile_number.to_string());
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn bind_telegram_chat(
        &self,
        mobile_number: &str,
        chat_id: &str,
    ) -> Result<u64, StoreError> {
        self.touch();
        let mut bound = 0;
        for record in self.records.lock().await.values_mut() {
            if record.mobile_number.as_deref() == Some(mobile_number) {
                record.telegram_chat_id = Some(chat_id.to_string());
                record.updated_at = Utc::now();
                bound += 1;
            }
        }
        Ok(bound)
    }
}

#[derive(Default)]
pub struct MemoryLedgerStore {
    records: Mutex<Vec<WithdrawalRecord>>,
    fail_appends: AtomicBool,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent appends fail, to exercise the post-debit write gap
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub async fn all(&self) -> Vec<WithdrawalRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn append(&self, record: &WithdrawalRecord) -> Result<(), StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("ledger writes disabled".to_string()));
        }
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn recent(
        &self,
        wallet_address: &str,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<WithdrawalRecord>, StoreError> {
        let records = self.records.lock().await;
        // Appends are chronological; walk backwards for newest first
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.wallet_address == wallet_address && r.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
