//! Threshold validation

use crate::models::{LatencyResult, ThresholdViolation, Thresholds, ThroughputResult};
use crate::types::ThresholdMetric;

/// Pure scoring of measurements against [`Thresholds`]
#[derive(Debug, Clone)]
pub struct ThresholdValidator {
    thresholds: Thresholds,
}

impl ThresholdValidator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Every breach across all results, latency first.
    ///
    /// Comparisons are strict: a value equal to its threshold passes. Empty
    /// result lists produce no violations.
    pub fn validate(&self, throughput: &[ThroughputResult], latency: &[LatencyResult]) -> Vec<ThresholdViolation> {
        let mut violations = Vec::new();

        for result in latency {
            if result.rtt_mean_ms > self.thresholds.max_latency_ms {
                violations.push(ThresholdViolation {
                    metric: ThresholdMetric::MeanLatency,
                    message: format!(
                        "Mean latency {:.2}ms exceeds threshold {:.2}ms",
                        result.rtt_mean_ms, self.thresholds.max_latency_ms
                    ),
                    observed: result.rtt_mean_ms,
                    threshold: self.thresholds.max_latency_ms,
                });
            }

            if result.packet_loss_percent > self.thresholds.max_packet_loss_percent {
                violations.push(ThresholdViolation {
                    metric: ThresholdMetric::PacketLoss,
                    message: format!(
                        "Packet loss {:.2}% exceeds threshold {:.2}%",
                        result.packet_loss_percent, self.thresholds.max_packet_loss_percent
                    ),
                    observed: result.packet_loss_percent,
                    threshold: self.thresholds.max_packet_loss_percent,
                });
            }
        }

        for result in throughput {
            if result.throughput_mbps < self.thresholds.min_throughput_mbps {
                violations.push(ThresholdViolation {
                    metric: ThresholdMetric::Throughput,
                    message: format!(
                        "{} throughput {:.2}Mbps below threshold {:.2}Mbps",
                        result.protocol, result.throughput_mbps, self.thresholds.min_throughput_mbps
                    ),
                    observed: result.throughput_mbps,
                    threshold: self.thresholds.min_throughput_mbps,
                });
            }
        }

        violations
    }
}
