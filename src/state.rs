use std::sync::Arc;

use crate::api::{BalanceOracle, Notifier, PrincipalResolver};
use crate::db::{BalanceStore, LedgerStore};
use crate::utils::Cooldowns;

/// Everything a request needs, shared across handlers
pub struct AppState {
    pub balances: Arc<dyn BalanceStore>,
    pub ledger: Arc<dyn LedgerStore>,
    pub auth: Arc<dyn PrincipalResolver>,
    /// Advisory cross-check and balance sync source
    pub oracle: Option<Arc<dyn BalanceOracle>>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub cooldowns: Cooldowns,
    pub telegram_bot_secret: Option<String>,
}

pub type SharedState = Arc<AppState>;
