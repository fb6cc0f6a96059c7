//! Concurrency + token-bucket scheduling for LLM calls. The bucket refills
//! lazily on `acquire` rather than via a background tick task, matching the
//! reference's lazy-refill-on-acquire design.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::time::sleep;

struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity_per_minute: u64) -> Self {
        let capacity = capacity_per_minute as f64;
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec: capacity / 60.0,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let elapsed = self.last_refill.elapsed().as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = Instant::now();
    }

    fn try_take(&mut self, needed: f64) -> bool {
        self.refill();
        if self.tokens >= needed {
            self.tokens -= needed;
            true
        } else {
            false
        }
    }
}

/// Bounds concurrent LLM calls via a semaphore and enforces a per-minute
/// token budget via a lazily-refilled bucket.
pub struct Scheduler {
    semaphore: Semaphore,
    bucket: Mutex<TokenBucket>,
}

/// Held across one LLM call; dropping releases the semaphore permit.
pub struct SchedulerPermit<'a> {
    _permit: tokio::sync::SemaphorePermit<'a>,
}

impl Scheduler {
    pub fn new(concurrency: usize, tpm_limit: u64) -> Self {
        Self {
            semaphore: Semaphore::new(concurrency),
            bucket: Mutex::new(TokenBucket::new(tpm_limit)),
        }
    }

    /// Acquires the concurrency semaphore, then polls the token bucket until
    /// `tokens_needed` tokens are available or `wait_timeout` elapses. On
    /// failure the semaphore permit is dropped before returning, per the
    /// "release on failure" contract.
    pub async fn acquire(
        &self,
        tokens_needed: u32,
        wait_timeout: Duration,
    ) -> Option<SchedulerPermit<'_>> {
        let permit = self.semaphore.acquire().await.ok()?;
        let deadline = Instant::now() + wait_timeout;

        loop {
            let got = {
                let mut bucket = self.bucket.lock().unwrap_or_else(|e| e.into_inner());
                bucket.try_take(tokens_needed as f64)
            };
            if got {
                return Some(SchedulerPermit { _permit: permit });
            }
            if Instant::now() >= deadline {
                drop(permit);
                return None;
            }
            sleep(Duration::from_millis(50)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquires_when_budget_available() {
        let scheduler = Scheduler::new(2, 80_000);
        let permit = scheduler.acquire(1_000, Duration::from_secs(1)).await;
        assert!(permit.is_some());
    }

    #[tokio::test]
    async fn fails_when_request_exceeds_entire_capacity() {
        let scheduler = Scheduler::new(2, 100);
        let permit = scheduler.acquire(10_000, Duration::from_millis(100)).await;
        assert!(permit.is_none());
    }

    #[tokio::test]
    async fn semaphore_bounds_concurrency() {
        let scheduler = Scheduler::new(1, 80_000);
        let _first = scheduler.acquire(10, Duration::from_secs(1)).await.unwrap();
        let second =
            tokio::time::timeout(Duration::from_millis(50), scheduler.acquire(10, Duration::from_millis(200)))
                .await;
        assert!(second.is_err() || second.unwrap().is_none());
    }
}
