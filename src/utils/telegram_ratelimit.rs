/// Telegram Bot API send throttle - 30 messages per second per bot token
use lazy_static::lazy_static;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

lazy_static! {
    static ref TELEGRAM_RATE_LIMITER: Mutex<TelegramRateLimiter> = Mutex::new(TelegramRateLimiter::new());
}

/// Hands out send slots so that no window ever holds more than `max_sends`.
///
/// A caller that finds the window full is given a slot in the future and
/// that slot is recorded immediately, so callers woken together are still
/// spread across windows.
pub struct TelegramRateLimiter {
    /// Admitted send times in ascending order, some possibly still ahead
    slots: VecDeque<Instant>,
    max_sends: usize,
    window: Duration,
}

impl TelegramRateLimiter {
    fn new() -> Self {
        Self::with_limit(30, Duration::from_secs(1))
    }

    fn with_limit(max_sends: usize, window: Duration) -> Self {
        Self {
            slots: VecDeque::with_capacity(max_sends),
            max_sends,
            window,
        }
    }

    /// Reserve the earliest allowed send time and return how long to wait for it
    fn reserve(&mut self, now: Instant) -> Duration {
        // Slots a full window behind `now` can no longer constrain anything
        while let Some(&front) = self.slots.front() {
            if front + self.window <= now {
                self.slots.pop_front();
            } else {
                break;
            }
        }

        // The new slot must trail the slot `max_sends` places back by a whole window
        let slot = if self.slots.len() < self.max_sends {
            now
        } else {
            let anchor = self.slots[self.slots.len() - self.max_sends];
            (anchor + self.window).max(now)
        };

        self.slots.push_back(slot);
        slot.saturating_duration_since(now)
    }
}

/// Wait for a send slot on the Bot API
pub async fn rate_limit_telegram_api() {
    let wait_duration = {
        // Slots stay valid after a poisoning panic
        let mut limiter = match TELEGRAM_RATE_LIMITER.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        limiter.reserve(Instant::now())
    };

    if !wait_duration.is_zero() {
        tracing::debug!("Telegram API rate limit: waiting {}ms", wait_duration.as_millis());
        tokio::time::sleep(wait_duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_burst_is_not_delayed() {
        let mut limiter = TelegramRateLimiter::new();
        let now = Instant::now();

        for _ in 0..30 {
            assert!(limiter.reserve(now).is_zero());
        }
        assert_eq!(limiter.reserve(now), Duration::from_secs(1));
    }

    #[test]
    fn test_throttled_sends_never_crowd_one_window() {
        let mut limiter = TelegramRateLimiter::new();
        let start = Instant::now();

        // 130 callers arrive together; each sends at start + wait
        let mut send_times: Vec<Instant> = (0..130).map(|_| start + limiter.reserve(start)).collect();
        send_times.sort();

        for (i, &opened) in send_times.iter().enumerate() {
            let in_window = send_times[i..]
                .iter()
                .take_while(|&&t| t < opened + Duration::from_secs(1))
                .count();
            assert!(in_window <= 30, "{} sends inside one window", in_window);
        }

        // 130 sends at 30 per second need five windows
        assert_eq!(*send_times.last().unwrap() - start, Duration::from_secs(4));
    }

    #[test]
    fn test_slots_free_up_as_time_passes() {
        let mut limiter = TelegramRateLimiter::with_limit(2, Duration::from_millis(100));
        let start = Instant::now();

        limiter.reserve(start);
        limiter.reserve(start);
        assert_eq!(limiter.reserve(start), Duration::from_millis(100));

        // The third send already holds a slot at +100ms, so only one is left there
        let later = start + Duration::from_millis(100);
        assert!(limiter.reserve(later).is_zero());
        assert_eq!(limiter.reserve(later), Duration::from_millis(100));
    }
}
