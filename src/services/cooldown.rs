//! Per-symbol alert cooldown bookkeeping.

use dashmap::DashMap;

/// Last-alert timestamps with a fixed window. Timestamps come from the
/// caller so scans can run against an injected clock.
pub struct CooldownMap {
    window_secs: i64,
    last_alert: DashMap<String, i64>,
}

impl CooldownMap {
    pub fn new(window_secs: i64) -> Self {
        Self {
            window_secs,
            last_alert: DashMap::new(),
        }
    }

    /// Whether `symbol` may alert at `now`.
    pub fn ready(&self, symbol: &str, now: i64) -> bool {
        match self.last_alert.get(symbol) {
            Some(at) => now - *at >= self.window_secs,
            None => true,
        }
    }

    /// Record an alert for `symbol` at `now`.
    pub fn stamp(&self, symbol: &str, now: i64) {
        self.last_alert.insert(symbol.to_string(), now);
    }

    /// Drop entries old enough to be ready anyway, bounding map growth.
    pub fn purge(&self, now: i64) {
        self.last_alert.retain(|_, at| now - *at < self.window_secs);
    }

    pub fn len(&self) -> usize {
        self.last_alert.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_alert.is_empty()
    }
}
