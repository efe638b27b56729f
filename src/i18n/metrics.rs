//! Loader metrics and observability.
//!
//! Counts where each `load` was answered from: memory, the persistent cache,
//! or the network. One instance per loader; nothing global.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one loader.
#[derive(Debug, Default)]
pub struct LoaderMetrics {
    /// Loads answered by the in-memory store
    memory_hits: AtomicUsize,

    /// Loads answered by the persistent cache (stale-while-revalidate)
    cache_hits: AtomicUsize,

    /// Loads that found nothing in the persistent cache (cold start)
    cache_misses: AtomicUsize,

    /// Network fetches actually started
    network_fetches: AtomicUsize,

    /// Network fetches that ended in failure
    network_failures: AtomicUsize,

    /// Callers that joined a fetch already in flight
    joined_fetches: AtomicUsize,
}

impl LoaderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_network_fetch(&self) {
        self.network_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_network_failure(&self) {
        self.network_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_joined_fetch(&self) {
        self.joined_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn network_fetches(&self) -> usize {
        self.network_fetches.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let memory_hits = self.memory_hits.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);

        // Memory hits never reach the persistent cache, so they don't count here
        let cache_queries = cache_hits + cache_misses;
        let cache_hit_rate = if cache_queries > 0 {
            (cache_hits as f64 / cache_queries as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            memory_hits,
            cache_hits,
            cache_misses,
            cache_hit_rate,
            network_fetches: self.network_fetches(),
            network_failures: self.network_failures.load(Ordering::Relaxed),
            joined_fetches: self.joined_fetches.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of loader counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub memory_hits: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Persistent cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub network_fetches: usize,
    pub network_failures: usize,
    pub joined_fetches: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_new_metrics_are_zero() {
        let report = LoaderMetrics::new().report();
        assert_eq!(report.memory_hits, 0);
        assert_eq!(report.cache_hits, 0);
        assert_eq!(report.cache_misses, 0);
        assert_eq!(report.cache_hit_rate, 0.0);
        assert_eq!(report.network_fetches, 0);
        assert_eq!(report.network_failures, 0);
        assert_eq!(report.joined_fetches, 0);
    }

    #[test]
    fn test_counters_increment() {
        let metrics = LoaderMetrics::new();
        metrics.record_memory_hit();
        metrics.record_memory_hit();
        metrics.record_network_fetch();
        metrics.record_network_failure();
        metrics.record_joined_fetch();

        let report = metrics.report();
        assert_eq!(report.memory_hits, 2);
        assert_eq!(report.network_fetches, 1);
        assert_eq!(report.network_failures, 1);
        assert_eq!(report.joined_fetches, 1);
        assert_eq!(metrics.network_fetches(), 1);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_cache_hit_rate() {
        let metrics = LoaderMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();

        let report = metrics.report();
        assert_eq!(report.cache_hits, 3);
        assert_eq!(report.cache_misses, 1);
        assert_eq!(report.cache_hit_rate, 75.0);
    }

    #[test]
    fn test_memory_hits_do_not_affect_hit_rate() {
        let metrics = LoaderMetrics::new();
        metrics.record_cache_miss();
        metrics.record_memory_hit();
        metrics.record_memory_hit();

        assert_eq!(metrics.report().cache_hit_rate, 0.0);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = LoaderMetrics::new();
        let b = LoaderMetrics::new();
        a.record_cache_hit();

        assert_eq!(a.report().cache_hits, 1);
        assert_eq!(b.report().cache_hits, 0);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = LoaderMetrics::new();
        metrics.record_cache_hit();

        let json = serde_json::to_value(metrics.report()).unwrap();
        assert_eq!(json["cache_hits"], 1);
        assert_eq!(json["cache_hit_rate"], 100.0);
    }
}
