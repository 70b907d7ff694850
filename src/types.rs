//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Transport protocol used by a throughput test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for Protocol {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(AppError::config(format!("Unknown protocol '{}' (expected tcp or udp)", other))),
        }
    }
}

/// Emulated topology shape requested from the provisioning side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyKind {
    /// All hosts attached to a single switch
    Star,
    /// Hosts chained through one switch each
    Linear,
}

impl FromStr for TopologyKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "star" => Ok(TopologyKind::Star),
            "linear" => Ok(TopologyKind::Linear),
            other => Err(AppError::config(format!("Unknown topology '{}' (expected star or linear)", other))),
        }
    }
}

/// Lifecycle states of a campaign run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignPhase {
    Idle,
    NetworkStarting,
    NetworkReady,
    RunningThroughput,
    RunningLatency,
    NetworkTeardown,
    Validating,
    ReportingDone,
    Complete,
}

impl CampaignPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignPhase::Idle => "idle",
            CampaignPhase::NetworkStarting => "network_starting",
            CampaignPhase::NetworkReady => "network_ready",
            CampaignPhase::RunningThroughput => "running_throughput",
            CampaignPhase::RunningLatency => "running_latency",
            CampaignPhase::NetworkTeardown => "network_teardown",
            CampaignPhase::Validating => "validating",
            CampaignPhase::ReportingDone => "reporting_done",
            CampaignPhase::Complete => "complete",
        }
    }
}

/// Where a recorded execution error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSource {
    /// Acquiring the network or resolving its endpoints
    Network,
    /// The throughput phase
    Throughput,
    /// The latency phase
    Latency,
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorSource::Network => "network",
            ErrorSource::Throughput => "throughput",
            ErrorSource::Latency => "latency",
        };
        f.write_str(name)
    }
}

/// Metric checked by the threshold validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMetric {
    MeanLatency,
    PacketLoss,
    Throughput,
}
