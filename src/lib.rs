//! Network Performance Campaign Runner
//!
//! Runs a measurement campaign between two endpoints of a network: repeated
//! iperf3 throughput tests per protocol, a UDP timestamp-echo latency probe,
//! then threshold scoring of everything that was measured. Every phase is
//! isolated so one failure never hides the results of another.

pub mod campaign;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod network;
pub mod output;
pub mod probe;
pub mod stats;
pub mod throughput;
pub mod types;

// Re-export commonly used types
pub use campaign::{Campaign, ThresholdValidator};
pub use error::{AppError, Result};
pub use models::{CampaignConfig, CampaignResult, LatencyResult, ThroughputResult};
pub use network::{Endpoint, LocalNetworkProvider, ManagedProcess, NetworkHandle, NetworkProvider};
pub use output::{CampaignReporter, ConsoleReporter};
pub use probe::RttProbe;
pub use stats::RttStatistics;
pub use throughput::ThroughputDriver;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information recorded by build.rs
pub const BUILD_TIME: &str = match option_env!("BUILD_TIME") {
    Some(value) => value,
    None => "unknown",
};
pub const GIT_COMMIT: &str = match option_env!("GIT_COMMIT") {
    Some(value) => value,
    None => "unknown",
};
pub const TARGET_TRIPLE: &str = match option_env!("TARGET_TRIPLE") {
    Some(value) => value,
    None => "unknown",
};

/// One-line version banner
pub fn version_banner() -> String {
    format!("{} v{} ({} {}, built {})", PKG_NAME, VERSION, GIT_COMMIT, TARGET_TRIPLE, BUILD_TIME)
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    // Network
    pub const DEFAULT_HOSTS: u32 = 2;
    pub const DEFAULT_NETWORK_SETTLE: Duration = Duration::from_secs(3);

    // Throughput
    pub const DEFAULT_TEST_DURATION: Duration = Duration::from_secs(60);
    pub const DEFAULT_ITERATIONS: u32 = 5;
    pub const DEFAULT_ITERATION_DELAY: Duration = Duration::from_secs(10);
    pub const DEFAULT_TCP_PORT: u16 = 5001;
    pub const DEFAULT_UDP_PORT: u16 = 5002;
    pub const DEFAULT_RESPONDER_SETTLE: Duration = Duration::from_secs(1);
    pub const DEFAULT_TRAFFIC_BINARY: &str = "iperf3";

    // Latency
    pub const DEFAULT_LATENCY_PORT: u16 = 5003;
    pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(1);
    pub const DEFAULT_PACKET_SIZE: usize = 64;
    pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(2);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
    pub const MAX_PROBE_TICKS: u32 = 1_000_000;

    // Thresholds
    pub const DEFAULT_MAX_LATENCY_MS: f64 = 50.0;
    pub const DEFAULT_MAX_PACKET_LOSS_PERCENT: f64 = 1.0;
    pub const DEFAULT_MIN_THROUGHPUT_MBPS: f64 = 10.0;

    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
