//! Authentication models

/// Caller identity resolved from a bearer credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
}
