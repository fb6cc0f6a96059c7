//! Per-key circuit breaker. `is_open`/`record_success`/`record_failure` are
//! the only entry points; nothing outside this module reaches into the map,
//! mirroring `BudgetTracker`'s encapsulation of its atomic counter.

use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone, Copy)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

impl Default for BreakerState {
    fn default() -> Self {
        Self { consecutive_failures: 0, opened_at: None }
    }
}

pub struct BreakerRegistry {
    state: DashMap<String, BreakerState>,
    threshold: u32,
    cooldown: Duration,
}

impl BreakerRegistry {
    pub fn new(threshold: u32, cooldown_seconds: u64) -> Self {
        Self {
            state: DashMap::new(),
            threshold,
            cooldown: Duration::from_secs(cooldown_seconds),
        }
    }

    pub fn is_open(&self, key: &str) -> bool {
        match self.state.get(key) {
            Some(entry) => match entry.opened_at {
                Some(opened_at) => opened_at.elapsed() < self.cooldown,
                None => false,
            },
            None => false,
        }
    }

    pub fn record_success(&self, key: &str) {
        self.state.insert(key.to_string(), BreakerState::default());
    }

    pub fn record_failure(&self, key: &str) {
        let mut entry = self.state.entry(key.to_string()).or_default();
        entry.consecutive_failures += 1;
        if entry.consecutive_failures >= self.threshold && entry.opened_at.is_none() {
            entry.opened_at = Some(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn closed_by_default() {
        let reg = BreakerRegistry::new(3, 600);
        assert!(!reg.is_open("positioning_themes"));
    }

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let reg = BreakerRegistry::new(2, 600);
        reg.record_failure("k");
        assert!(!reg.is_open("k"));
        reg.record_failure("k");
        assert!(reg.is_open("k"));
    }

    #[test]
    fn success_resets_counter() {
        let reg = BreakerRegistry::new(2, 600);
        reg.record_failure("k");
        reg.record_success("k");
        reg.record_failure("k");
        assert!(!reg.is_open("k"));
    }

    #[test]
    fn reopens_after_cooldown_elapses() {
        let reg = BreakerRegistry::new(1, 0);
        reg.record_failure("k");
        sleep(Duration::from_millis(5));
        assert!(!reg.is_open("k"));
    }
}
