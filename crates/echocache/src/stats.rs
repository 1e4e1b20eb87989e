//! Page cache statistics tracking

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-local statistics for a [`WebCache`](crate::WebCache)
///
/// These complement the per-URL access counters kept in the store: they
/// cover only this process and split accesses into hits, misses and failed
/// fetches.
#[derive(Debug, Default)]
pub struct FetchStats {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl FetchStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a page served from the store
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a page that had to be fetched
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fetch that failed
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get total failed fetches
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Pages actually fetched and cached (misses minus failed fetches)
    pub fn fetched(&self) -> u64 {
        self.misses().saturating_sub(self.failures())
    }

    /// Share of served pages that came from the store (0.0 to 1.0)
    ///
    /// Failed fetches served nothing and are left out.
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits();
        let served = hits + self.fetched();
        if served == 0 {
            0.0
        } else {
            hits as f64 / served as f64
        }
    }
}

impl fmt::Display for FetchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits, {} misses ({} failed), hit ratio {:.2}",
            self.hits(),
            self.misses(),
            self.failures(),
            self.hit_ratio()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_basic() {
        let stats = FetchStats::new();

        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        assert_eq!(stats.hits(), 2);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.failures(), 0);
        assert_eq!(stats.fetched(), 1);
        assert_eq!(stats.hit_ratio(), 2.0 / 3.0);
    }

    #[test]
    fn test_failures_excluded_from_ratio() {
        let stats = FetchStats::new();

        stats.record_hit();
        stats.record_miss();
        stats.record_miss();
        stats.record_failure();

        assert_eq!(stats.fetched(), 1);
        assert_eq!(stats.hit_ratio(), 0.5);
    }

    #[test]
    fn test_empty_ratio() {
        let stats = FetchStats::new();
        stats.record_miss();
        stats.record_failure();

        assert_eq!(stats.fetched(), 0);
        assert_eq!(stats.hit_ratio(), 0.0);
    }

    #[test]
    fn test_display() {
        let stats = FetchStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_miss();
        stats.record_failure();

        assert_eq!(stats.to_string(), "1 hits, 2 misses (1 failed), hit ratio 0.50");
    }
}
