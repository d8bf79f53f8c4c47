use rust_decimal::Decimal;

use crate::models::Token;

/// Characters MarkdownV2 requires to be escaped outside entities
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Shorten a wallet address to its first and last eight characters
fn shorten_address(address: &str) -> String {
    if address.len() <= 16 {
        return address.to_string();
    }
    format!("{}...{}", &address[..8], &address[address.len() - 8..])
}

/// Notification text for a completed withdrawal
pub fn format_withdrawal_message(
    amount: Decimal,
    token: Token,
    wallet_address: &str,
    signature: &str,
) -> String {
    format!(
        "💸 *Withdrawal Successful*\n\nAmount: {} {}\nTo: {}\nTx: {}",
        escape_markdown(&amount.normalize().to_string()),
        token,
        escape_markdown(&shorten_address(wallet_address)),
        escape_markdown(signature),
    )
}
