use tracing::{debug, error};

use crate::models::Principal;
use crate::state::AppState;
use crate::utils::LedgerError;

/// Extract the credential from an `Authorization: Bearer <token>` value
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    let value = authorization?.trim();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        None if value.eq_ignore_ascii_case("bearer") => return None,
        None => value,
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolve the caller behind a bearer credential.
///
/// Returns `Unauthorized` when no credential was sent or the auth provider
/// rejects it, `InternalError` when the provider cannot be reached.
pub async fn authenticate(state: &AppState, bearer: Option<&str>) -> Result<Principal, LedgerError> {
    let bearer = bearer.ok_or(LedgerError::Unauthorized)?;

    match state.auth.resolve(bearer).await {
        Ok(Some(principal)) => {
            debug!("Authenticated user {}", principal.user_id);
            Ok(principal)
        }
        Ok(None) => Err(LedgerError::Unauthorized),
        Err(e) => {
            error!("Auth provider error: {}", e);
            Err(LedgerError::InternalError)
        }
    }
}

/// Check the shared secret presented by the companion Telegram bot
pub fn check_bot_secret(state: &AppState, presented: Option<&str>) -> Result<(), LedgerError> {
    match (state.telegram_bot_secret.as_deref(), presented) {
        (Some(expected), Some(presented)) if expected == presented => Ok(()),
        _ => Err(LedgerError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHarness;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("bearer  xyz ")), Some("xyz"));
        assert_eq!(bearer_token(Some("Basic Zm9vOmJhcg==")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let harness = TestHarness::new();

        let principal = authenticate(&harness.state, Some(TestHarness::TOKEN)).await.unwrap();
        assert_eq!(principal.user_id, TestHarness::USER);

        assert_eq!(
            authenticate(&harness.state, Some("forged")).await,
            Err(LedgerError::Unauthorized)
        );
        assert_eq!(authenticate(&harness.state, None).await, Err(LedgerError::Unauthorized));
    }

    #[test]
    fn test_bot_secret() {
        let harness = TestHarness::new();

        assert!(check_bot_secret(&harness.state, Some(TestHarness::BOT_SECRET)).is_ok());
        assert_eq!(check_bot_secret(&harness.state, Some("guess")), Err(LedgerError::Unauthorized));
        assert_eq!(check_bot_secret(&harness.state, None), Err(LedgerError::Unauthorized));
    }
}
