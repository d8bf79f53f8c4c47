pub mod balance_service;
pub mod permission_service;
pub mod telegram_service;
pub mod withdraw_service;
