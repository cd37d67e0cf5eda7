//! Counting limiter for outbound work.
//!
//! Every refresh holds one slot for the duration of its fetch-diff-persist
//! sequence, so upstream sources never see more than `capacity` requests
//! from one run at a time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// No slot freed up within the allowed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LimiterError {
    #[error("no capacity within {0:?}")]
    Timeout(Duration),
    #[error("limiter closed")]
    Closed,
}

/// Bounded-concurrency gate shared by clones.
#[derive(Debug, Clone)]
pub struct Limiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl Limiter {
    /// A limiter with `capacity` slots. Zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently held.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a slot, giving up after `timeout` when one is set.
    /// The slot is released when the permit drops.
    ///
    /// # Errors
    ///
    /// Returns [`LimiterError::Timeout`] if no slot frees up in time.
    pub async fn acquire(
        &self,
        timeout: Option<Duration>,
    ) -> Result<OwnedSemaphorePermit, LimiterError> {
        let acquire = Arc::clone(&self.semaphore).acquire_owned();
        let permit = match timeout {
            Some(limit) => tokio::time::timeout(limit, acquire)
                .await
                .map_err(|_| LimiterError::Timeout(limit))?,
            None => acquire.await,
        };
        permit.map_err(|_| LimiterError::Closed)
    }

    /// Run `work` while holding a slot.
    ///
    /// # Errors
    ///
    /// Returns an error only if the limiter was closed.
    pub async fn run<F: Future>(&self, work: F) -> Result<F::Output, LimiterError> {
        let _permit = self.acquire(None).await?;
        Ok(work.await)
    }

    /// Run `work` while holding a slot, waiting at most `timeout` for one.
    /// `work` is never started when the wait times out.
    ///
    /// # Errors
    ///
    /// Returns [`LimiterError::Timeout`] if no slot frees up in time.
    pub async fn run_with_timeout<F: Future>(
        &self,
        timeout: Duration,
        work: F,
    ) -> Result<F::Output, LimiterError> {
        let _permit = self.acquire(Some(timeout)).await?;
        Ok(work.await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn zero_capacity_becomes_one() {
        assert_eq!(Limiter::new(0).capacity(), 1);
    }

    #[tokio::test]
    async fn never_exceeds_capacity() {
        let limiter = Limiter::new(3);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let limiter = limiter.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            tasks.push(tokio::spawn(async move {
                limiter
                    .run(async {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(limiter.available(), 3);
    }

    #[tokio::test]
    async fn timeout_leaves_work_unstarted() {
        let limiter = Limiter::new(1);
        let _held = limiter.acquire(None).await.unwrap();
        let started = AtomicBool::new(false);

        let result = limiter
            .run_with_timeout(Duration::from_millis(20), async {
                started.store(true, Ordering::SeqCst);
            })
            .await;

        assert_eq!(result, Err(LimiterError::Timeout(Duration::from_millis(20))));
        assert!(!started.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn released_slot_is_reusable() {
        let limiter = Limiter::new(1);
        {
            let _permit = limiter.acquire(None).await.unwrap();
            assert_eq!(limiter.available(), 0);
        }
        let value = limiter
            .run_with_timeout(Duration::from_millis(50), async { 7 })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn peak_is_bounded_by_capacity(capacity in 1usize..6, tasks in 0usize..24) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let peak = runtime.block_on(async {
                let limiter = Limiter::new(capacity);
                let in_flight = Arc::new(AtomicUsize::new(0));
                let peak = Arc::new(AtomicUsize::new(0));
                let mut set = tokio::task::JoinSet::new();
                for _ in 0..tasks {
                    let limiter = limiter.clone();
                    let in_flight = in_flight.clone();
                    let peak = peak.clone();
                    set.spawn(async move {
                        limiter
                            .run(async {
                                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                                peak.fetch_max(now, Ordering::SeqCst);
                                tokio::time::sleep(Duration::from_millis(1)).await;
                                in_flight.fetch_sub(1, Ordering::SeqCst);
                            })
                            .await
                            .unwrap();
                    });
                }
                while set.join_next().await.is_some() {}
                assert_eq!(limiter.available(), capacity);
                peak.load(Ordering::SeqCst)
            });
            prop_assert!(peak <= capacity);
            prop_assert!(tasks == 0 || peak >= 1);
        }
    }
}
