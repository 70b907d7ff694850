//! RTT statistics
//!
//! All functions take samples in milliseconds, in the order they were
//! collected. Jitter depends on that order.


use serde::{Deserialize, Serialize};

/// Summary of an RTT sample sequence
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RttStatistics {
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    /// Sample standard deviation (n-1 divisor)
    pub std_dev_ms: f64,
    /// Mean absolute difference between consecutive samples
    pub jitter_ms: f64,
}

impl RttStatistics {
    /// Compute every statistic in one call; all zero for an empty slice
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mean_ms = mean(samples);
        Self {
            min_ms: min(samples),
            max_ms: max(samples),
            mean_ms,
            std_dev_ms: sample_std_dev(samples, mean_ms),
            jitter_ms: jitter(samples),
        }
    }
}

/// Smallest sample, 0 when empty
pub fn min(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Largest sample, 0 when empty
pub fn max(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Arithmetic mean, 0 when empty
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Sample standard deviation around `mean`; 0 with fewer than two samples
pub fn sample_std_dev(samples: &[f64], mean: f64) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }

    let variance = samples.iter()
        .map(|x| (x - mean).powi(2))
        .sum::<f64>() / (samples.len() - 1) as f64;

    variance.sqrt()
}

/// Mean absolute difference between consecutive samples; 0 with fewer than two
pub fn jitter(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }

    let total: f64 = samples.windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .sum();

    total / (samples.len() - 1) as f64
}

/// Percentage of `sent` that never came back; 0 when nothing was sent
pub fn packet_loss_percent(sent: u64, received: u64) -> f64 {
    if sent == 0 {
        return 0.0;
    }
    let lost = sent.saturating_sub(received);
    lost as f64 / sent as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_samples() {
        let summary = RttStatistics::from_samples(&[]);
        assert_eq!(summary, RttStatistics::default());
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(jitter(&[]), 0.0);
    }

    #[test]
    fn test_basic_statistics() {
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let summary = RttStatistics::from_samples(&samples);

        assert_eq!(summary.min_ms, 2.0);
        assert_eq!(summary.max_ms, 9.0);
        assert_eq!(summary.mean_ms, 5.0);
        // Sum of squared deviations is 32, over n-1 = 7
        assert!((summary.std_dev_ms - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_jitter_uses_send_order() {
        assert!((jitter(&[10.0, 20.0, 10.0]) - 10.0).abs() < 1e-12);
        assert!((jitter(&[10.0, 10.0, 20.0]) - 5.0).abs() < 1e-12);
        assert_eq!(jitter(&[42.0]), 0.0);
    }

    #[test]
    fn test_std_dev_single_sample() {
        assert_eq!(sample_std_dev(&[3.0], 3.0), 0.0);
    }

    #[test]
    fn test_packet_loss() {
        assert_eq!(packet_loss_percent(0, 0), 0.0);
        assert_eq!(packet_loss_percent(5, 4), 20.0);
        assert_eq!(packet_loss_percent(10, 0), 100.0);
        assert_eq!(packet_loss_percent(10, 10), 0.0);
        // More replies than requests never reports negative loss
        assert_eq!(packet_loss_percent(3, 5), 0.0);
    }
}
