pub mod encryption;
pub mod errors;
pub mod ratelimit;
pub mod signature;
pub mod telegram_ratelimit;
pub mod validation;

pub use encryption::{decrypt_contact, encrypt_contact, CryptoError};
pub use errors::LedgerError;
pub use ratelimit::Cooldowns;
pub use signature::confirmation_reference;
pub use telegram_ratelimit::rate_limit_telegram_api;
