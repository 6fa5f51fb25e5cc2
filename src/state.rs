use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use sea_orm::DatabaseConnection;

use crate::notify::Notifier;

/// Failed-login throttle keyed by "email|ip".
pub struct LoginThrottle {
    /// Maps key → (attempt count, window start)
    attempts: DashMap<String, (u32, Instant)>,
    max_attempts: u32,
    decay: Duration,
}

impl LoginThrottle {
    pub fn new(max_attempts: u32, decay_secs: u64) -> Self {
        Self {
            attempts: DashMap::new(),
            max_attempts,
            decay: Duration::from_secs(decay_secs),
        }
    }

    /// Attempts recorded inside the current decay window.
    pub fn attempts(&self, key: &str) -> u32 {
        match self.attempts.get(key) {
            Some(entry) if entry.1.elapsed() < self.decay => entry.0,
            _ => 0,
        }
    }

    /// Record a failed attempt. An expired window restarts at one.
    pub fn hit(&self, key: &str) {
        let now = Instant::now();
        let mut entry = self.attempts.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();
        if window_start.elapsed() >= self.decay {
            *count = 1;
            *window_start = now;
        } else {
            *count += 1;
        }
    }

    pub fn too_many_attempts(&self, key: &str) -> bool {
        self.attempts(key) >= self.max_attempts
    }

    /// Seconds until the window for this key ends.
    pub fn available_in(&self, key: &str) -> u64 {
        self.attempts
            .get(key)
            .map(|entry| self.decay.saturating_sub(entry.1.elapsed()).as_secs())
            .unwrap_or(0)
    }

    /// Forget a key (successful login).
    pub fn clear(&self, key: &str) {
        self.attempts.remove(key);
    }

    /// Drop entries whose window has long expired (call from a background task)
    pub fn cleanup(&self) {
        self.attempts
            .retain(|_, (_, start)| start.elapsed() < self.decay * 2);
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// JWT signing secret
    pub jwt_secret: String,
    pub external_host: String,
    /// Support address shown in failure messages
    pub site_email: String,
    pub login_throttle: Arc<LoginThrottle>,
    pub notifier: Arc<Notifier>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        jwt_secret: String,
        external_host: String,
        site_email: String,
        notifier: Notifier,
    ) -> Self {
        Self {
            db,
            jwt_secret,
            external_host,
            site_email,
            login_throttle: Arc::new(LoginThrottle::new(3, 600)), // 3 attempts / 10 min
            notifier: Arc::new(notifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locks_after_max_attempts() {
        let throttle = LoginThrottle::new(3, 600);
        let key = "user@example.com|10.0.0.1";

        assert!(!throttle.too_many_attempts(key));
        throttle.hit(key);
        throttle.hit(key);
        assert!(!throttle.too_many_attempts(key));
        throttle.hit(key);
        assert!(throttle.too_many_attempts(key));
        assert_eq!(throttle.attempts(key), 3);
    }

    #[test]
    fn clear_resets_counter() {
        let throttle = LoginThrottle::new(3, 600);
        let key = "user@example.com|10.0.0.1";

        for _ in 0..3 {
            throttle.hit(key);
        }
        assert!(throttle.too_many_attempts(key));
        throttle.clear(key);
        assert!(!throttle.too_many_attempts(key));
        assert_eq!(throttle.attempts(key), 0);
    }

    #[test]
    fn keys_are_independent() {
        let throttle = LoginThrottle::new(3, 600);
        for _ in 0..3 {
            throttle.hit("a@example.com|10.0.0.1");
        }
        assert!(throttle.too_many_attempts("a@example.com|10.0.0.1"));
        assert!(!throttle.too_many_attempts("a@example.com|10.0.0.2"));
        assert!(!throttle.too_many_attempts("b@example.com|10.0.0.1"));
    }

    #[test]
    fn expired_window_restarts_at_one() {
        let throttle = LoginThrottle::new(3, 0);
        let key = "user@example.com|10.0.0.1";
        throttle.hit(key);
        throttle.hit(key);
        // decay of zero means every window is already expired
        assert_eq!(throttle.attempts(key), 0);
        assert!(!throttle.too_many_attempts(key));
    }

    #[test]
    fn available_in_bounded_by_decay() {
        let throttle = LoginThrottle::new(3, 600);
        let key = "user@example.com|10.0.0.1";
        assert_eq!(throttle.available_in(key), 0);
        throttle.hit(key);
        assert!(throttle.available_in(key) <= 600);
        assert!(throttle.available_in(key) >= 599);
    }
}
