//! Online latency statistics for repeated executions.
//!
//! Uses Welford's algorithm so mean and deviation are available without
//! storing every sample.

use std::time::Duration;

/// Running mean, deviation and extremes of execution latencies.
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    count: usize,
    mean_nanos: f64,
    m2: f64, // sum of squared differences from the mean
    min: Option<Duration>,
    max: Option<Duration>,
}

impl ExecutionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one measured execution.
    pub fn record(&mut self, elapsed: Duration) {
        let nanos = elapsed.as_nanos() as f64;
        self.count += 1;
        let delta = nanos - self.mean_nanos;
        self.mean_nanos += delta / self.count as f64;
        self.m2 += delta * (nanos - self.mean_nanos);

        self.min = Some(self.min.map_or(elapsed, |min| min.min(elapsed)));
        self.max = Some(self.max.map_or(elapsed, |max| max.max(elapsed)));
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Duration {
        Duration::from_nanos(self.mean_nanos.round() as u64)
    }

    /// Sample standard deviation; zero with fewer than two samples.
    pub fn std_dev(&self) -> Duration {
        if self.count < 2 {
            return Duration::ZERO;
        }
        let variance = self.m2 / (self.count - 1) as f64;
        Duration::from_nanos(variance.sqrt().round() as u64)
    }

    pub fn min(&self) -> Option<Duration> {
        self.min
    }

    pub fn max(&self) -> Option<Duration> {
        self.max
    }

    /// Executions per second implied by the mean latency.
    ///
    /// `None` before the first sample, and when every sample measured zero
    /// time (executions faster than the clock resolution).
    pub fn throughput(&self) -> Option<f64> {
        if self.count == 0 || self.mean_nanos <= 0.0 {
            return None;
        }
        Some(1.0e9 / self.mean_nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let stats = ExecutionStats::new();
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.mean(), Duration::ZERO);
        assert_eq!(stats.std_dev(), Duration::ZERO);
        assert_eq!(stats.min(), None);
        assert_eq!(stats.throughput(), None);
    }

    #[test]
    fn test_mean_std_and_extremes() {
        let mut stats = ExecutionStats::new();
        for micros in [2, 4, 4, 4, 5, 5, 7, 9] {
            stats.record(Duration::from_micros(micros));
        }

        assert_eq!(stats.count(), 8);
        assert_eq!(stats.mean(), Duration::from_micros(5));
        // sample variance of the data set is 32/7 µs²
        let expected = (32.0f64 / 7.0).sqrt() * 1000.0;
        assert!((stats.std_dev().as_nanos() as f64 - expected).abs() <= 1.0);
        assert_eq!(stats.min(), Some(Duration::from_micros(2)));
        assert_eq!(stats.max(), Some(Duration::from_micros(9)));
        assert!((stats.throughput().unwrap() - 200_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_latency_has_no_throughput() {
        let mut stats = ExecutionStats::new();
        for _ in 0..3 {
            stats.record(Duration::ZERO);
        }
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.mean(), Duration::ZERO);
        assert_eq!(stats.throughput(), None);
    }
}
