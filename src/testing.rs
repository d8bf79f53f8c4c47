//! In-memory collaborators for unit tests

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::{ApiError, BalanceOracle, Notifier, PrincipalResolver};
use crate::db::{BalanceStore, MemoryBalanceStore, MemoryLedgerStore, StoreError};
use crate::models::{BalanceRecord, Principal, Token};
use crate::state::{AppState, SharedState};
use crate::utils::Cooldowns;

pub struct StaticAuth {
    tokens: HashMap<String, String>,
}

#[async_trait]
impl PrincipalResolver for StaticAuth {
    async fn resolve(&self, bearer: &str) -> Result<Option<Principal>, ApiError> {
        Ok(self.tokens.get(bearer).map(|user_id| Principal {
            user_id: user_id.clone(),
        }))
    }
}

/// Oracle answering a fixed value, or failing when `None`
pub struct FixedOracle {
    pub balance: Option<Decimal>,
}

#[async_trait]
impl BalanceOracle for FixedOracle {
    async fn sol_balance(&self, _wallet_address: &str) -> Result<Decimal, ApiError> {
        self.balance
            .ok_or_else(|| ApiError::RequestError("connection refused".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, chat_id: &str, text: &str) -> Result<(), ApiError> {
        if self.fail {
            return Err(ApiError::Forbidden("bot was blocked by the user".to_string()));
        }
        self.sent.lock().await.push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Memory store whose conditional debit always loses, as if another
/// request drained the balance between the check and the write
pub struct RefusingDebitStore {
    inner: Arc<MemoryBalanceStore>,
}

#[async_trait]
impl BalanceStore for RefusingDebitStore {
    async fn find(&self, wallet_address: &str, user_id: &str)
        -> Result<Option<BalanceRecord>, StoreError> {
        self.inner.find(wallet_address, user_id).await
    }

    async fn get_or_create(&self, wallet_address: &str, user_id: &str)
        -> Result<BalanceRecord, StoreError> {
        self.inner.get_or_create(wallet_address, user_id).await
    }

    async fn debit(&self, _wallet_address: &str, _user_id: &str, _token: Token, _amount: Decimal)
        -> Result<Option<Decimal>, StoreError> {
        Ok(None)
    }

    async fn set_sol_balance(&self, wallet_address: &str, user_id: &str, balance: Decimal)
        -> Result<BalanceRecord, StoreError> {
        self.inner.set_sol_balance(wallet_address, user_id, balance).await
    }

    async fn set_mobile_number(&self, wallet_address: &str, user_id: &str, mobile_number: &str)
        -> Result<(), StoreError> {
        self.inner.set_mobile_number(wallet_address, user_id, mobile_number).await
    }

    async fn bind_telegram_chat(&self, mobile_number: &str, chat_id: &str)
        -> Result<u64, StoreError> {
        self.inner.bind_telegram_chat(mobile_number, chat_id).await
    }
}

pub struct TestHarness {
    pub state: SharedState,
    pub balances: Arc<MemoryBalanceStore>,
    pub ledger: Arc<MemoryLedgerStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestHarness {
    pub const TOKEN: &'static str = "token-alice";
    pub const USER: &'static str = "user-alice";
    pub const OTHER_TOKEN: &'static str = "token-bob";
    pub const OTHER_USER: &'static str = "user-bob";
    pub const WALLET: &'static str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    pub const BOT_SECRET: &'static str = "bot-secret";

    pub fn new() -> Self {
        Self::build(None, RecordingNotifier::default(), false)
    }

    pub fn with_oracle(balance: Option<Decimal>) -> Self {
        Self::build(Some(FixedOracle { balance }), RecordingNotifier::default(), false)
    }

    pub fn with_failing_notifier() -> Self {
        Self::build(
            None,
            RecordingNotifier {
                fail: true,
                ..Default::default()
            },
            false,
        )
    }

    /// Balance reads work but every debit is refused by the store
    pub fn with_refused_debits() -> Self {
        Self::build(None, RecordingNotifier::default(), true)
    }

    fn build(oracle: Option<FixedOracle>, notifier: RecordingNotifier, refuse_debits: bool) -> Self {
        let balances = Arc::new(MemoryBalanceStore::new());
        let ledger = Arc::new(MemoryLedgerStore::new());
        let notifier = Arc::new(notifier);
        let tokens = HashMap::from([
            (Self::TOKEN.to_string(), Self::USER.to_string()),
            (Self::OTHER_TOKEN.to_string(), Self::OTHER_USER.to_string()),
        ]);

        let balance_store: Arc<dyn BalanceStore> = if refuse_debits {
            Arc::new(RefusingDebitStore {
                inner: balances.clone(),
            })
        } else {
            balances.clone()
        };

        let state = AppState {
            balances: balance_store,
            ledger: ledger.clone(),
            auth: Arc::new(StaticAuth { tokens }),
            oracle: oracle.map(|o| Arc::new(o) as Arc<dyn BalanceOracle>),
            notifier: Some(notifier.clone() as Arc<dyn Notifier>),
            cooldowns: Cooldowns::default(),
            telegram_bot_secret: Some(Self::BOT_SECRET.to_string()),
        };

        Self {
            state: Arc::new(state),
            balances,
            ledger,
            notifier,
        }
    }

    /// Seed the caller's record for [`Self::WALLET`]
    pub async fn seed_balance(&self, sol: Decimal, usdc: Decimal, chat_id: Option<&str>) {
        let mut record = BalanceRecord::empty(Self::WALLET, Self::USER);
        record.sol_balance = sol;
        record.usdc_balance = usdc;
        record.telegram_chat_id = chat_id.map(str::to_string);
        self.balances.seed(record).await;
    }

    pub async fn sol_balance(&self) -> Option<Decimal> {
        self.balances
            .snapshot(Self::WALLET, Self::USER)
            .await
            .map(|r| r.sol_balance)
    }
}
