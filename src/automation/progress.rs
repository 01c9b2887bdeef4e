//! Progress tracking for bulk operations
//!
//! Counters are atomic and observer calls are serialized, so one tracker can
//! be shared between concurrent workers.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Callback invoked after every update
pub type ProgressObserver = Box<dyn Fn(&ProgressTracker) + Send + Sync>;

/// Completed/failed counters over a known total
pub struct ProgressTracker {
    total: usize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    errors: Mutex<Vec<String>>,
    observer: Option<ProgressObserver>,
    notify: Mutex<()>,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            errors: Mutex::new(Vec::new()),
            observer: None,
            notify: Mutex::new(()),
            started: Instant::now(),
        }
    }

    pub fn with_observer(total: usize, observer: Option<ProgressObserver>) -> Self {
        Self {
            observer,
            ..Self::new(total)
        }
    }

    /// Record one outcome; `error` is only kept for failures
    pub fn update(&self, success: bool, error: Option<String>) {
        if success {
            self.completed.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = error {
                self.errors.lock().push(error);
            }
        }

        if let Some(observer) = &self.observer {
            let _guard = self.notify.lock();
            observer(self);
        }
    }

    pub fn record_success(&self) {
        self.update(true, None);
    }

    pub fn record_failure(&self, error: impl Into<String>) {
        self.update(false, Some(error.into()));
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> usize {
        self.completed() + self.failed()
    }

    /// Snapshot of recorded errors
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    /// Processed share of the total, in percent (0 when total is 0)
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.processed() as f64 / self.total as f64 * 100.0
    }

    /// Completed share of the total, in percent (0 when total is 0)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed() as f64 / self.total as f64 * 100.0
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_complete(&self) -> bool {
        self.processed() >= self.total
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("total", &self.total)
            .field("completed", &self.completed())
            .field("failed", &self.failed())
            .field("errors", &self.errors.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counts_and_percentage() {
        let tracker = ProgressTracker::new(4);
        tracker.record_success();
        tracker.record_failure("vm-2: (429) QuotaExceeded: vm-2");
        tracker.update(false, None);

        assert_eq!(tracker.completed(), 1);
        assert_eq!(tracker.failed(), 2);
        assert_eq!(tracker.errors().len(), 1);
        assert_eq!(tracker.percentage(), 75.0);
        assert_eq!(tracker.success_rate(), 25.0);
        assert!(!tracker.is_complete());
    }

    #[test]
    fn test_zero_total() {
        let tracker = ProgressTracker::new(0);
        assert_eq!(tracker.percentage(), 0.0);
        assert!(tracker.is_complete());
    }

    #[test]
    fn test_observer_sees_every_update() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let tracker = ProgressTracker::with_observer(
            2,
            Some(Box::new(move |t: &ProgressTracker| sink.lock().push(t.percentage()))),
        );
        tracker.record_success();
        tracker.record_success();
        assert_eq!(*seen.lock(), vec![50.0, 100.0]);
    }

    #[test]
    fn test_shared_across_threads() {
        let tracker = Arc::new(ProgressTracker::new(400));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tracker = tracker.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if i % 2 == 0 {
                            tracker.record_success();
                        } else {
                            tracker.record_failure("boom");
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tracker.completed(), 200);
        assert_eq!(tracker.failed(), 200);
        assert_eq!(tracker.errors().len(), 200);
    }
}
