//! Measurement and campaign result records

use crate::models::config::Thresholds;
use crate::stats::{self, RttStatistics};
use crate::types::{AppError, ErrorSource, Protocol, ThresholdMetric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized outcome of one traffic-generator client run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputResult {
    pub protocol: Protocol,

    /// Requested test duration
    pub duration_seconds: u64,

    /// Measured throughput in Mbps
    pub throughput_mbps: f64,

    /// TCP only
    pub retransmissions: Option<u64>,

    /// UDP only, 0-100
    pub packet_loss_percent: Option<f64>,

    /// UDP only
    pub jitter_ms: Option<f64>,

    pub bytes_sent: Option<u64>,
    pub bytes_received: Option<u64>,
}

impl ThroughputResult {
    /// A TCP result; protocol-specific UDP fields stay empty
    pub fn tcp(duration_seconds: u64, throughput_mbps: f64, retransmissions: u64) -> Self {
        Self {
            protocol: Protocol::Tcp,
            duration_seconds,
            throughput_mbps: throughput_mbps.max(0.0),
            retransmissions: Some(retransmissions),
            packet_loss_percent: None,
            jitter_ms: None,
            bytes_sent: None,
            bytes_received: None,
        }
    }

    /// A UDP result; loss is clamped to 0-100
    pub fn udp(duration_seconds: u64, throughput_mbps: f64, packet_loss_percent: f64, jitter_ms: f64) -> Self {
        Self {
            protocol: Protocol::Udp,
            duration_seconds,
            throughput_mbps: throughput_mbps.max(0.0),
            retransmissions: None,
            packet_loss_percent: Some(packet_loss_percent.clamp(0.0, 100.0)),
            jitter_ms: Some(jitter_ms.max(0.0)),
            bytes_sent: None,
            bytes_received: None,
        }
    }

    /// Attach byte counters
    pub fn with_bytes(mut self, sent: Option<u64>, received: Option<u64>) -> Self {
        self.bytes_sent = sent;
        self.bytes_received = received;
        self
    }
}

/// Statistics of one RTT probe run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyResult {
    pub rtt_min_ms: f64,
    pub rtt_max_ms: f64,
    pub rtt_mean_ms: f64,
    pub rtt_std_ms: f64,
    pub jitter_ms: f64,
    pub packet_loss_percent: f64,
    pub packets_sent: u64,
    pub packets_received: u64,

    /// Raw RTTs in send order
    pub rtt_samples: Vec<f64>,
}

impl LatencyResult {
    /// Build the result from the number of requests sent and the RTTs that came back.
    ///
    /// With no samples every RTT field is zero and loss is 100%, which is how
    /// a dead path is reported instead of failing the run.
    pub fn from_samples(packets_sent: u64, rtt_samples: Vec<f64>) -> Self {
        let packets_received = (rtt_samples.len() as u64).min(packets_sent);

        if rtt_samples.is_empty() {
            return Self {
                rtt_min_ms: 0.0,
                rtt_max_ms: 0.0,
                rtt_mean_ms: 0.0,
                rtt_std_ms: 0.0,
                jitter_ms: 0.0,
                packet_loss_percent: 100.0,
                packets_sent,
                packets_received: 0,
                rtt_samples,
            };
        }

        let summary = RttStatistics::from_samples(&rtt_samples);
        Self {
            rtt_min_ms: summary.min_ms,
            rtt_max_ms: summary.max_ms,
            rtt_mean_ms: summary.mean_ms,
            rtt_std_ms: summary.std_dev_ms,
            jitter_ms: summary.jitter_ms,
            packet_loss_percent: stats::packet_loss_percent(packets_sent, packets_received),
            packets_sent,
            packets_received,
            rtt_samples,
        }
    }
}

/// A phase that failed to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseError {
    pub source: ErrorSource,
    /// Category of the underlying error (`PARSE`, `PROCESS`, ...)
    pub category: String,
    pub message: String,
}

impl PhaseError {
    pub fn new<C: Into<String>, S: Into<String>>(source: ErrorSource, category: C, message: S) -> Self {
        Self { source, category: category.into(), message: message.into() }
    }

    pub fn from_error(source: ErrorSource, error: &AppError) -> Self {
        Self::new(source, error.category(), error.to_string())
    }
}

/// A measurement that ran but broke a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdViolation {
    pub metric: ThresholdMetric,
    pub message: String,
    pub observed: f64,
    pub threshold: f64,
}

/// Consolidated outcome of one campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignResult {
    /// Derived from the local start time, `%Y%m%d_%H%M%S`
    pub campaign_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: f64,
    pub throughput_results: Vec<ThroughputResult>,
    pub latency_results: Vec<LatencyResult>,
    pub thresholds: Thresholds,
    pub passed: bool,
    pub phase_errors: Vec<PhaseError>,
    pub violations: Vec<ThresholdViolation>,
}

impl CampaignResult {
    /// Assemble the record; `passed` and the duration are derived here
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        campaign_id: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        throughput_results: Vec<ThroughputResult>,
        latency_results: Vec<LatencyResult>,
        thresholds: Thresholds,
        phase_errors: Vec<PhaseError>,
        violations: Vec<ThresholdViolation>,
    ) -> Self {
        let duration_seconds = ((end_time - start_time).num_milliseconds() as f64 / 1000.0).max(0.0);
        let passed = phase_errors.is_empty() && violations.is_empty();

        Self {
            campaign_id,
            start_time,
            end_time,
            duration_seconds,
            throughput_results,
            latency_results,
            thresholds,
            passed,
            phase_errors,
            violations,
        }
    }

    /// Every error and violation message, phase errors first
    pub fn errors(&self) -> Vec<String> {
        self.phase_errors
            .iter()
            .map(|e| format!("{} phase error: {}", e.source, e.message))
            .chain(self.violations.iter().map(|v| v.message.clone()))
            .collect()
    }

    /// Phase errors raised by `source`
    pub fn errors_from(&self, source: ErrorSource) -> Vec<&PhaseError> {
        self.phase_errors.iter().filter(|e| e.source == source).collect()
    }
}
