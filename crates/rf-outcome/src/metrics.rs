//! Call metrics — an injected counter sink
//!
//! The engine reports named events to whatever [`MetricsSink`] the caller
//! passes in. Counting never feeds back into evaluation.

use std::collections::BTreeMap;

use parking_lot::Mutex;

/// Receiver of named call events
pub trait MetricsSink: Send + Sync {
    /// Count one occurrence of `name`
    fn record(&self, name: &str);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetrics;

impl MetricsSink for NoMetrics {
    fn record(&self, _name: &str) {}
}

/// Counting sink behind one coarse lock
#[derive(Debug, Default)]
pub struct CallMetrics {
    counts: Mutex<BTreeMap<String, u64>>,
}

impl CallMetrics {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for one name
    pub fn count(&self, name: &str) -> u64 {
        self.counts.lock().get(name).copied().unwrap_or(0)
    }

    /// Snapshot of every count
    pub fn report(&self) -> BTreeMap<String, u64> {
        self.counts.lock().clone()
    }

    /// Clear all counts
    pub fn reset(&self) {
        self.counts.lock().clear();
    }
}

impl MetricsSink for CallMetrics {
    fn record(&self, name: &str) {
        let mut counts = self.counts.lock();
        match counts.get_mut(name) {
            Some(count) => *count += 1,
            None => {
                counts.insert(name.to_string(), 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_metrics_counts() {
        let metrics = CallMetrics::new();
        metrics.record("play_round");
        metrics.record("play_round");
        metrics.record("execute_stage");

        assert_eq!(metrics.count("play_round"), 2);
        assert_eq!(metrics.count("missing"), 0);
        assert_eq!(metrics.report().len(), 2);

        metrics.reset();
        assert!(metrics.report().is_empty());
    }

    #[test]
    fn test_call_metrics_shared_across_threads() {
        let metrics = std::sync::Arc::new(CallMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = std::sync::Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.record("spin");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.count("spin"), 400);
    }
}
