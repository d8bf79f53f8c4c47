use std::sync::Arc;

use reqwest::Client as HttpClient;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod db;
mod models;
mod routes;
mod services;
mod state;
mod utils;

#[cfg(test)]
mod testing;

use api::{BalanceOracle, Notifier, SolanaRpcOracle, SupabaseAuth, TelegramClient};
use config::Config;
use db::{BalanceStore, LedgerStore};
use state::AppState;
use utils::Cooldowns;

type Stores = (Arc<dyn BalanceStore>, Arc<dyn LedgerStore>);

async fn build_stores(config: &Config) -> Result<Stores, String> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set, balances are kept in memory and lost on restart");
        return Ok((
            Arc::new(db::MemoryBalanceStore::new()),
            Arc::new(db::MemoryLedgerStore::new()),
        ));
    };

    let contact_key = config
        .contact_encryption_key
        .clone()
        .ok_or("CONTACT_ENCRYPTION_KEY not set in environment")?;

    info!("Initializing database...");
    let pool = db::init_db(database_url)
        .await
        .map_err(|e| format!("Failed to initialize database: {}", e))?;
    info!("Database initialized successfully");

    Ok((
        Arc::new(db::MySqlBalanceStore::new(pool.clone(), contact_key.clone())),
        Arc::new(db::MySqlLedgerStore::new(pool, contact_key)),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let mut filter = EnvFilter::from_default_env();
    for directive in ["sniper_ledger=debug", "sqlx=warn", "hyper=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting sniper ledger v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let (balances, ledger) = match build_stores(&config).await {
        Ok(stores) => stores,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let http_client = HttpClient::new();

    let oracle: Arc<dyn BalanceOracle> = Arc::new(SolanaRpcOracle::new(
        http_client.clone(),
        config.solana_rpc_url.clone(),
    ));

    let notifier = match config.telegram_bot_token.clone() {
        Some(token) => {
            let client = TelegramClient::new(http_client.clone(), token);
            Some(Arc::new(client) as Arc<dyn Notifier>)
        }
        None => {
            warn!("TELEGRAM_BOT_TOKEN not set, withdrawal notifications are disabled");
            None
        }
    };

    if config.telegram_bot_secret.is_none() {
        warn!("TELEGRAM_BOT_SECRET not set, chat binding requests will be rejected");
    }

    let state = Arc::new(AppState {
        balances,
        ledger,
        auth: Arc::new(SupabaseAuth::new(
            http_client,
            &config.supabase_url,
            config.supabase_service_key.clone(),
        )),
        oracle: Some(oracle),
        notifier,
        cooldowns: Cooldowns::default(),
        telegram_bot_secret: config.telegram_bot_secret.clone(),
    });

    let app = routes::router(state);

    let server = match axum::Server::try_bind(&config.bind_addr) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to bind {}: {}", config.bind_addr, e);
            return;
        }
    };

    info!("Listening on http://{}", config.bind_addr);
    if let Err(e) = server
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }
}
