//! Data models and structures for campaign runs

pub mod config;
pub mod results;

// Re-export main model types
pub use config::{
    CampaignConfig, LatencySettings, LoggingSettings, Thresholds, ThroughputSettings, TopologyConfig,
};
pub use results::{
    CampaignResult, LatencyResult, PhaseError, ThresholdViolation, ThroughputResult,
};
