use std::net::SocketAddr;
use thiserror::Error;

use crate::api::SolanaRpcOracle;
use crate::utils::encryption::{validate_key, CryptoError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set in environment")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("CONTACT_ENCRYPTION_KEY is invalid: {0}")]
    EncryptionKey(#[from] CryptoError),
}

/// Runtime settings, read from the process environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Absent: run against in-memory stores
    pub database_url: Option<String>,
    pub contact_encryption_key: Option<String>,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub solana_rpc_url: String,
    pub telegram_bot_token: Option<String>,
    /// Shared secret the companion Telegram bot presents when binding chats
    pub telegram_bot_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let database_url = optional("DATABASE_URL");
        let contact_encryption_key = optional("CONTACT_ENCRYPTION_KEY");
        if database_url.is_some() {
            let key = contact_encryption_key
                .as_deref()
                .ok_or(ConfigError::Missing("CONTACT_ENCRYPTION_KEY"))?;
            validate_key(key)?;
        }

        Ok(Self {
            bind_addr,
            database_url,
            contact_encryption_key,
            supabase_url: required("SUPABASE_URL")?,
            supabase_service_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            solana_rpc_url: optional("SOLANA_RPC_URL")
                .unwrap_or_else(|| SolanaRpcOracle::DEFAULT_RPC_URL.to_string()),
            telegram_bot_token: optional("TELEGRAM_BOT_TOKEN"),
            telegram_bot_secret: optional("TELEGRAM_BOT_SECRET"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    const KEY_HEX: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults_for_demo_mode() {
        let config = load(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service-key"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.database_url.is_none());
        assert_eq!(config.solana_rpc_url, SolanaRpcOracle::DEFAULT_RPC_URL);
        assert!(config.telegram_bot_token.is_none());
    }

    #[test]
    fn test_supabase_is_required() {
        assert_matches!(
            load(&[("SUPABASE_SERVICE_ROLE_KEY", "service-key")]),
            Err(ConfigError::Missing("SUPABASE_URL"))
        );
    }

    #[test]
    fn test_database_needs_encryption_key() {
        let base = [
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service-key"),
            ("DATABASE_URL", "mysql://localhost/ledger"),
        ];
        assert_matches!(load(&base), Err(ConfigError::Missing("CONTACT_ENCRYPTION_KEY")));

        let mut short_key = base.to_vec();
        short_key.push(("CONTACT_ENCRYPTION_KEY", "abcd"));
        assert_matches!(load(&short_key), Err(ConfigError::EncryptionKey(_)));

        let mut good = base.to_vec();
        good.push(("CONTACT_ENCRYPTION_KEY", KEY_HEX));
        assert!(load(&good).is_ok());
    }

    #[test]
    fn test_bad_bind_addr() {
        assert_matches!(
            load(&[
                ("SUPABASE_URL", "https://project.supabase.co"),
                ("SUPABASE_SERVICE_ROLE_KEY", "service-key"),
                ("BIND_ADDR", "not-an-addr"),
            ]),
            Err(ConfigError::Invalid { name: "BIND_ADDR", .. })
        );
    }
}
