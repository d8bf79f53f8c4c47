use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

const DEFAULT_COOLDOWN_SECONDS: u64 = 5;

/// Per-caller cooldown for expensive operations (balance sync hits the RPC)
pub struct Cooldowns {
    last_seen: Mutex<HashMap<(String, &'static str), u64>>,
    cooldown_seconds: u64,
}

impl Cooldowns {
    pub fn new(cooldown_seconds: u64) -> Self {
        Self {
            last_seen: Mutex::new(HashMap::new()),
            cooldown_seconds,
        }
    }

    /// Record an attempt by `user_id` at `action`.
    /// Returns Ok(()) if the cooldown has passed, Err(remaining_seconds) otherwise.
    pub async fn check(&self, user_id: &str, action: &'static str) -> Result<(), u64> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        self.check_at(user_id, action, now).await
    }

    async fn check_at(&self, user_id: &str, action: &'static str, now: u64) -> Result<(), u64> {
        let key = (user_id.to_string(), action);
        let mut last_seen = self.last_seen.lock().await;

        if let Some(&last_time) = last_seen.get(&key) {
            let elapsed = now.saturating_sub(last_time);
            if elapsed < self.cooldown_seconds {
                return Err(self.cooldown_seconds - elapsed);
            }
        }

        // Expired entries constrain nobody
        let cooldown = self.cooldown_seconds;
        last_seen.retain(|_, &mut seen| now.saturating_sub(seen) < cooldown);

        last_seen.insert(key, now);
        Ok(())
    }
}

impl Default for Cooldowns {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_SECONDS)
    }
}
