pub mod client;
pub mod message;
pub mod models;

pub use client::TelegramClient;
pub use message::format_withdrawal_message;
