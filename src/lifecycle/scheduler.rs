//! Inter-cycle suspension
//!
//! The manager never calls `tokio::time::sleep` directly, so tests can drive
//! cycles back to back with `ManualScheduler`.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Suspends the control loop between cycles
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock scheduler backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately and records every requested sleep
#[derive(Debug, Default)]
pub struct ManualScheduler {
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of times the loop suspended
    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().map(|s| s.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Scheduler for ManualScheduler {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_scheduler_records_sleeps() {
        let scheduler = ManualScheduler::new();
        scheduler.sleep(Duration::from_secs(5)).await;
        scheduler.sleep(Duration::from_millis(250)).await;

        assert_eq!(scheduler.sleep_count(), 2);
        assert_eq!(
            scheduler.sleeps(),
            vec![Duration::from_secs(5), Duration::from_millis(250)]
        );
    }

    #[tokio::test]
    async fn test_tokio_scheduler_waits() {
        let start = tokio::time::Instant::now();
        TokioScheduler.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
