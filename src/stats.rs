//! Round-trip statistics - latency sampling for a probe run
//!
//! One sample per matched exchange. Counts stay small (a run is a few
//! hundred events), so every sample is kept and percentiles are exact.

use std::time::Duration;

use serde::Serialize;

/// Round-trip latency samples for one run.
#[derive(Debug, Default, Clone)]
pub struct RoundTripStats {
    samples_us: Vec<u64>,
}

impl RoundTripStats {
    pub fn new() -> Self {
        RoundTripStats {
            samples_us: Vec::with_capacity(256),
        }
    }

    /// Record the round-trip time of one matched exchange.
    #[inline]
    pub fn record(&mut self, rtt: Duration) {
        self.samples_us.push(rtt.as_micros() as u64);
    }

    pub fn len(&self) -> usize {
        self.samples_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples_us.is_empty()
    }

    pub fn min(&self) -> Option<u64> {
        self.samples_us.iter().copied().min()
    }

    pub fn max(&self) -> Option<u64> {
        self.samples_us.iter().copied().max()
    }

    pub fn avg(&self) -> Option<u64> {
        if self.samples_us.is_empty() {
            return None;
        }
        Some(self.samples_us.iter().sum::<u64>() / self.samples_us.len() as u64)
    }

    /// Calculate percentile from samples
    ///
    /// # Arguments
    /// * `p` - Percentile (0-100), e.g., 50.0 for median, 99.0 for P99
    pub fn percentile(&self, p: f64) -> Option<u64> {
        if self.samples_us.is_empty() {
            return None;
        }
        let mut sorted = self.samples_us.clone();
        sorted.sort_unstable();
        let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        Some(sorted[idx.min(sorted.len() - 1)])
    }

    /// Condense the samples into the serializable report form.
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            samples: self.len(),
            min_us: self.min().unwrap_or(0),
            avg_us: self.avg().unwrap_or(0),
            p50_us: self.percentile(50.0).unwrap_or(0),
            p99_us: self.percentile(99.0).unwrap_or(0),
            max_us: self.max().unwrap_or(0),
        }
    }
}

/// Latency summary carried in run reports (microseconds).
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub samples: usize,
    pub min_us: u64,
    pub avg_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile() {
        let mut stats = RoundTripStats::new();
        for i in 1..=100 {
            stats.record(Duration::from_micros(i));
        }

        assert_eq!(stats.min(), Some(1));
        assert_eq!(stats.max(), Some(100));
        let p50 = stats.percentile(50.0).unwrap();
        assert!(p50 == 50 || p50 == 51, "P50 should be ~50, got {}", p50);
        assert_eq!(stats.percentile(99.0), Some(99));
    }

    #[test]
    fn test_empty_stats() {
        let stats = RoundTripStats::new();
        assert!(stats.is_empty());
        assert_eq!(stats.min(), None);
        assert_eq!(stats.percentile(50.0), None);

        let summary = stats.summary();
        assert_eq!(summary.samples, 0);
        assert_eq!(summary.max_us, 0);
    }

    #[test]
    fn test_summary() {
        let mut stats = RoundTripStats::new();
        stats.record(Duration::from_micros(100));
        stats.record(Duration::from_micros(300));

        let summary = stats.summary();
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.min_us, 100);
        assert_eq!(summary.avg_us, 200);
        assert_eq!(summary.max_us, 300);
    }
}
