//! Configuration data model and validation

use crate::logging::{LogFormat, LogLevel};
use crate::types::{AppError, Protocol, Result, TopologyKind};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// Complete configuration for one campaign run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Topology requested from the network provider
    #[serde(default)]
    pub network: TopologyConfig,

    /// Throughput phase settings
    #[serde(default)]
    pub throughput: ThroughputSettings,

    /// Latency phase settings
    #[serde(default)]
    pub latency: LatencySettings,

    /// Pass/fail thresholds
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Logger settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl CampaignConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every section, then settings that span sections
    pub fn validate(&self) -> Result<()> {
        self.validate_sections()?;

        if self.throughput.udp_bitrate.is_some() && !self.throughput.protocols.contains(&Protocol::Udp) {
            return Err(AppError::config("A UDP bitrate is set but udp is not among the tested protocols"));
        }

        Ok(())
    }

    /// Validate each section on its own
    pub fn validate_sections(&self) -> Result<()> {
        self.network.validate()?;
        self.throughput.validate()?;
        self.latency.validate()?;
        self.thresholds.validate()?;
        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        self.merge_from_lookup(|key| std::env::var(key).ok())
    }

    /// Merge overrides read through `lookup` (an environment-like source)
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(protocols) = lookup("TEST_PROTOCOLS") {
            self.throughput.protocols = protocols
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(Protocol::from_str)
                .collect::<Result<Vec<_>>>()?;
        }

        if let Some(duration) = lookup("TEST_DURATION_SECONDS") {
            self.throughput.duration_seconds = duration.parse()
                .map_err(|e| AppError::config(format!("Invalid TEST_DURATION_SECONDS value '{}': {}", duration, e)))?;
        }

        if let Some(iterations) = lookup("TEST_ITERATIONS") {
            self.throughput.iterations = iterations.parse()
                .map_err(|e| AppError::config(format!("Invalid TEST_ITERATIONS value '{}': {}", iterations, e)))?;
        }

        if let Some(delay) = lookup("ITERATION_DELAY_SECONDS") {
            self.throughput.delay_between_iterations_seconds = delay.parse()
                .map_err(|e| AppError::config(format!("Invalid ITERATION_DELAY_SECONDS value '{}': {}", delay, e)))?;
        }

        if let Some(bitrate) = lookup("UDP_BITRATE") {
            let bitrate = bitrate.trim().to_string();
            self.throughput.udp_bitrate = if bitrate.is_empty() { None } else { Some(bitrate) };
        }

        if let Some(duration) = lookup("LATENCY_DURATION_SECONDS") {
            self.latency.duration_seconds = duration.parse()
                .map_err(|e| AppError::config(format!("Invalid LATENCY_DURATION_SECONDS value '{}': {}", duration, e)))?;
        }

        if let Some(interval) = lookup("LATENCY_INTERVAL_SECONDS") {
            self.latency.interval_seconds = interval.parse()
                .map_err(|e| AppError::config(format!("Invalid LATENCY_INTERVAL_SECONDS value '{}': {}", interval, e)))?;
        }

        if let Some(max_latency) = lookup("MAX_LATENCY_MS") {
            self.thresholds.max_latency_ms = max_latency.parse()
                .map_err(|e| AppError::config(format!("Invalid MAX_LATENCY_MS value '{}': {}", max_latency, e)))?;
        }

        if let Some(max_loss) = lookup("MAX_PACKET_LOSS_PERCENT") {
            self.thresholds.max_packet_loss_percent = max_loss.parse()
                .map_err(|e| AppError::config(format!("Invalid MAX_PACKET_LOSS_PERCENT value '{}': {}", max_loss, e)))?;
        }

        if let Some(min_throughput) = lookup("MIN_THROUGHPUT_MBPS") {
            self.thresholds.min_throughput_mbps = min_throughput.parse()
                .map_err(|e| AppError::config(format!("Invalid MIN_THROUGHPUT_MBPS value '{}': {}", min_throughput, e)))?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.parse()?;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }

        if let Some(enable_color) = lookup("ENABLE_COLOR") {
            self.logging.enable_color = enable_color.parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Topology requested from the provisioning collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    #[serde(default = "default_topology")]
    pub topology: TopologyKind,

    /// Number of hosts; the campaign uses the first two
    #[serde(default = "default_hosts")]
    pub hosts: u32,

    /// One-way link delay to emulate
    #[serde(default = "default_link_latency_ms")]
    pub latency_ms: f64,

    /// Link loss to emulate, in percent
    #[serde(default = "default_link_loss_percent")]
    pub packet_loss_percent: f64,

    /// Link bandwidth cap; `None` means unshaped
    #[serde(default = "default_bandwidth_mbps")]
    pub bandwidth_mbps: Option<f64>,

    #[serde(default = "default_switch_name")]
    pub switch_name: String,

    /// Stabilization wait between acquiring the network and testing it
    #[serde(default = "default_network_settle_seconds")]
    pub settle_seconds: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            topology: default_topology(),
            hosts: default_hosts(),
            latency_ms: default_link_latency_ms(),
            packet_loss_percent: default_link_loss_percent(),
            bandwidth_mbps: default_bandwidth_mbps(),
            switch_name: default_switch_name(),
            settle_seconds: default_network_settle_seconds(),
        }
    }
}

impl TopologyConfig {
    pub fn settle_time(&self) -> Duration {
        Duration::from_secs_f64(self.settle_seconds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hosts < 2 {
            return Err(AppError::config(format!("At least 2 hosts are required, got {}", self.hosts)));
        }

        if self.latency_ms < 0.0 || !self.latency_ms.is_finite() {
            return Err(AppError::config("Link latency must be a non-negative number"));
        }

        if !(0.0..=100.0).contains(&self.packet_loss_percent) {
            return Err(AppError::config("Link packet loss must be between 0 and 100 percent"));
        }

        if let Some(bandwidth) = self.bandwidth_mbps {
            if bandwidth <= 0.0 || !bandwidth.is_finite() {
                return Err(AppError::config("Link bandwidth must be greater than 0"));
            }
        }

        if self.settle_seconds < 0.0 || !self.settle_seconds.is_finite() {
            return Err(AppError::config("Network settle time cannot be negative"));
        }

        Ok(())
    }
}

/// Throughput phase settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSettings {
    /// Protocols tested, in order
    #[serde(default = "default_protocols")]
    pub protocols: Vec<Protocol>,

    #[serde(default = "default_test_duration_secs")]
    pub duration_seconds: u64,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default = "default_iteration_delay_secs")]
    pub delay_between_iterations_seconds: u64,

    #[serde(default = "default_tcp_port")]
    pub tcp_port: u16,

    #[serde(default = "default_udp_port")]
    pub udp_port: u16,

    /// Target bitrate passed to UDP runs (e.g. "10M")
    #[serde(default)]
    pub udp_bitrate: Option<String>,

    /// Ask the traffic generator for JSON output
    #[serde(default = "default_structured_output")]
    pub structured_output: bool,

    /// Wait after launching the responder before the first client run
    #[serde(default = "default_responder_settle_secs")]
    pub responder_settle_seconds: f64,

    /// Traffic-generator executable
    #[serde(default = "default_traffic_binary")]
    pub binary: String,
}

impl Default for ThroughputSettings {
    fn default() -> Self {
        Self {
            protocols: default_protocols(),
            duration_seconds: default_test_duration_secs(),
            iterations: default_iterations(),
            delay_between_iterations_seconds: default_iteration_delay_secs(),
            tcp_port: default_tcp_port(),
            udp_port: default_udp_port(),
            udp_bitrate: None,
            structured_output: default_structured_output(),
            responder_settle_seconds: default_responder_settle_secs(),
            binary: default_traffic_binary(),
        }
    }
}

impl ThroughputSettings {
    pub fn iteration_delay(&self) -> Duration {
        Duration::from_secs(self.delay_between_iterations_seconds)
    }

    pub fn responder_settle(&self) -> Duration {
        Duration::from_secs_f64(self.responder_settle_seconds)
    }

    /// Responder port dedicated to `protocol`
    pub fn port_for(&self, protocol: Protocol) -> u16 {
        match protocol {
            Protocol::Tcp => self.tcp_port,
            Protocol::Udp => self.udp_port,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration_seconds == 0 {
            return Err(AppError::config("Throughput test duration must be greater than 0"));
        }

        if self.iterations == 0 {
            return Err(AppError::config("Iteration count must be greater than 0"));
        }

        if self.iterations > 100 {
            return Err(AppError::config("Iteration count cannot exceed 100"));
        }

        if self.tcp_port == 0 || self.udp_port == 0 {
            return Err(AppError::config("Traffic-generator ports must be non-zero"));
        }

        if self.binary.trim().is_empty() {
            return Err(AppError::config("Traffic-generator binary cannot be empty"));
        }

        if self.responder_settle_seconds < 0.0 || !self.responder_settle_seconds.is_finite() {
            return Err(AppError::config("Responder settle time cannot be negative"));
        }

        Ok(())
    }
}

/// Latency phase settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySettings {
    /// Responder port; 0 binds an ephemeral port
    #[serde(default = "default_latency_port")]
    pub port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_latency_duration_secs")]
    pub duration_seconds: f64,

    /// Fixed pause between probe ticks
    #[serde(default = "default_probe_interval_secs")]
    pub interval_seconds: f64,

    /// Request size in bytes, timestamp included
    #[serde(default = "default_packet_size")]
    pub packet_size: usize,

    /// Per-tick wait for a reply
    #[serde(default = "default_receive_timeout_secs")]
    pub receive_timeout_seconds: f64,

    /// Responder wake-up period for observing the stop signal
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_seconds: f64,
}

impl Default for LatencySettings {
    fn default() -> Self {
        Self {
            port: default_latency_port(),
            bind_address: default_bind_address(),
            duration_seconds: default_latency_duration_secs(),
            interval_seconds: default_probe_interval_secs(),
            packet_size: default_packet_size(),
            receive_timeout_seconds: default_receive_timeout_secs(),
            poll_interval_seconds: default_poll_interval_secs(),
        }
    }
}

impl LatencySettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_seconds)
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.receive_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_seconds)
    }

    fn raw_tick_count(&self) -> f64 {
        if self.interval_seconds <= 0.0 {
            return 1.0;
        }
        // Absorb float noise so 0.3 / 0.1 yields 3 ticks, not 4.
        (self.duration_seconds / self.interval_seconds - 1e-9).ceil().max(1.0)
    }

    /// Number of probe ticks: `ceil(duration / interval)`, never less than one.
    ///
    /// Validated settings never exceed [`MAX_PROBE_TICKS`](crate::defaults::MAX_PROBE_TICKS).
    pub fn tick_count(&self) -> u32 {
        self.raw_tick_count().min(crate::defaults::MAX_PROBE_TICKS as f64) as u32
    }

    pub fn bind_ip(&self) -> Result<IpAddr> {
        self.bind_address.parse::<IpAddr>()
            .map_err(|e| AppError::config(format!("Invalid latency bind address '{}': {}", self.bind_address, e)))
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_ip()?;

        if self.duration_seconds <= 0.0 || !self.duration_seconds.is_finite() {
            return Err(AppError::config("Latency test duration must be greater than 0"));
        }

        if self.interval_seconds <= 0.0 || !self.interval_seconds.is_finite() {
            return Err(AppError::config("Probe interval must be greater than 0"));
        }

        if self.raw_tick_count() > crate::defaults::MAX_PROBE_TICKS as f64 {
            return Err(AppError::config(format!(
                "Latency test of {}s at {}s intervals exceeds {} probes",
                self.duration_seconds,
                self.interval_seconds,
                crate::defaults::MAX_PROBE_TICKS
            )));
        }

        if self.packet_size < crate::probe::wire::TIMESTAMP_LEN {
            return Err(AppError::config(format!(
                "Probe packet size must be at least {} bytes, got {}",
                crate::probe::wire::TIMESTAMP_LEN, self.packet_size
            )));
        }

        if self.packet_size > crate::probe::wire::MAX_DATAGRAM {
            return Err(AppError::config(format!(
                "Probe packet size cannot exceed {} bytes",
                crate::probe::wire::MAX_DATAGRAM
            )));
        }

        if self.receive_timeout_seconds <= 0.0 || !self.receive_timeout_seconds.is_finite() {
            return Err(AppError::config("Probe receive timeout must be greater than 0"));
        }

        if self.poll_interval_seconds <= 0.0 || !self.poll_interval_seconds.is_finite() {
            return Err(AppError::config("Responder poll interval must be greater than 0"));
        }

        Ok(())
    }
}

/// Pass/fail thresholds applied after the test phases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: f64,

    #[serde(default = "default_max_packet_loss_percent")]
    pub max_packet_loss_percent: f64,

    #[serde(default = "default_min_throughput_mbps")]
    pub min_throughput_mbps: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_latency_ms: default_max_latency_ms(),
            max_packet_loss_percent: default_max_packet_loss_percent(),
            min_throughput_mbps: default_min_throughput_mbps(),
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        if self.max_latency_ms < 0.0 || !self.max_latency_ms.is_finite() {
            return Err(AppError::config("max_latency_ms must be a non-negative number"));
        }

        if !(0.0..=100.0).contains(&self.max_packet_loss_percent) {
            return Err(AppError::config("max_packet_loss_percent must be between 0 and 100"));
        }

        if self.min_throughput_mbps < 0.0 || !self.min_throughput_mbps.is_finite() {
            return Err(AppError::config("min_throughput_mbps must be a non-negative number"));
        }

        Ok(())
    }
}

/// Logger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    #[serde(default = "default_enable_color")]
    pub enable_color: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            enable_color: default_enable_color(),
        }
    }
}

// Default value functions for serde
fn default_topology() -> TopologyKind {
    TopologyKind::Star
}

fn default_hosts() -> u32 {
    crate::defaults::DEFAULT_HOSTS
}

fn default_link_latency_ms() -> f64 {
    10.0
}

fn default_link_loss_percent() -> f64 {
    0.1
}

fn default_bandwidth_mbps() -> Option<f64> {
    Some(100.0)
}

fn default_switch_name() -> String {
    "s1".to_string()
}

fn default_network_settle_seconds() -> f64 {
    crate::defaults::DEFAULT_NETWORK_SETTLE.as_secs_f64()
}

fn default_protocols() -> Vec<Protocol> {
    vec![Protocol::Tcp]
}

fn default_test_duration_secs() -> u64 {
    crate::defaults::DEFAULT_TEST_DURATION.as_secs()
}

fn default_iterations() -> u32 {
    crate::defaults::DEFAULT_ITERATIONS
}

fn default_iteration_delay_secs() -> u64 {
    crate::defaults::DEFAULT_ITERATION_DELAY.as_secs()
}

fn default_tcp_port() -> u16 {
    crate::defaults::DEFAULT_TCP_PORT
}

fn default_udp_port() -> u16 {
    crate::defaults::DEFAULT_UDP_PORT
}

fn default_structured_output() -> bool {
    true
}

fn default_responder_settle_secs() -> f64 {
    crate::defaults::DEFAULT_RESPONDER_SETTLE.as_secs_f64()
}

fn default_traffic_binary() -> String {
    crate::defaults::DEFAULT_TRAFFIC_BINARY.to_string()
}

fn default_latency_port() -> u16 {
    crate::defaults::DEFAULT_LATENCY_PORT
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_latency_duration_secs() -> f64 {
    crate::defaults::DEFAULT_TEST_DURATION.as_secs_f64()
}

fn default_probe_interval_secs() -> f64 {
    crate::defaults::DEFAULT_PROBE_INTERVAL.as_secs_f64()
}

fn default_packet_size() -> usize {
    crate::defaults::DEFAULT_PACKET_SIZE
}

fn default_receive_timeout_secs() -> f64 {
    crate::defaults::DEFAULT_RECEIVE_TIMEOUT.as_secs_f64()
}

fn default_poll_interval_secs() -> f64 {
    crate::defaults::DEFAULT_POLL_INTERVAL.as_secs_f64()
}

fn default_max_latency_ms() -> f64 {
    crate::defaults::DEFAULT_MAX_LATENCY_MS
}

fn default_max_packet_loss_percent() -> f64 {
    crate::defaults::DEFAULT_MAX_PACKET_LOSS_PERCENT
}

fn default_min_throughput_mbps() -> f64 {
    crate::defaults::DEFAULT_MIN_THROUGHPUT_MBPS
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_log_format() -> LogFormat {
    LogFormat::Console
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = CampaignConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_defaults() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.max_latency_ms, 50.0);
        assert_eq!(thresholds.max_packet_loss_percent, 1.0);
        assert_eq!(thresholds.min_throughput_mbps, 10.0);
    }

    #[test]
    fn test_missing_threshold_keys_use_defaults() {
        let thresholds: Thresholds = serde_json::from_str(r#"{"max_latency_ms": 100}"#).unwrap();
        assert_eq!(thresholds.max_latency_ms, 100.0);
        assert_eq!(thresholds.max_packet_loss_percent, 1.0);
        assert_eq!(thresholds.min_throughput_mbps, 10.0);
    }

    #[test]
    fn test_partial_campaign_config_deserializes() {
        let config: CampaignConfig = serde_json::from_str(
            r#"{"throughput": {"protocols": ["tcp", "udp"], "iterations": 1}}"#,
        ).unwrap();
        assert_eq!(config.throughput.protocols, vec![Protocol::Tcp, Protocol::Udp]);
        assert_eq!(config.throughput.iterations, 1);
        assert_eq!(config.throughput.duration_seconds, 60);
        assert_eq!(config.latency.port, 5003);
    }

    #[test]
    fn test_single_host_invalid() {
        let mut config = CampaignConfig::default();
        config.network.hosts = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_iterations_invalid() {
        let mut config = CampaignConfig::default();
        config.throughput.iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_undersized_packet_invalid() {
        let mut config = CampaignConfig::default();
        config.latency.packet_size = 7;
        assert!(config.validate().is_err());
        config.latency.packet_size = 8;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_bind_address_invalid() {
        let mut config = CampaignConfig::default();
        config.latency.bind_address = "not-an-ip".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_loss_threshold_range() {
        let mut config = CampaignConfig::default();
        config.thresholds.max_packet_loss_percent = 150.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tick_count() {
        let mut latency = LatencySettings::default();
        latency.duration_seconds = 5.0;
        latency.interval_seconds = 1.0;
        assert_eq!(latency.tick_count(), 5);

        latency.duration_seconds = 0.3;
        latency.interval_seconds = 0.1;
        assert_eq!(latency.tick_count(), 3);

        latency.duration_seconds = 2.5;
        latency.interval_seconds = 1.0;
        assert_eq!(latency.tick_count(), 3);

        latency.duration_seconds = 0.01;
        assert_eq!(latency.tick_count(), 1);
    }

    #[test]
    fn test_bitrate_requires_udp_after_merge() {
        let mut config = CampaignConfig::default();
        config.merge_from_lookup(lookup_from(&[("TEST_PROTOCOLS", "tcp"), ("UDP_BITRATE", "20M")])).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.category(), "CONFIG");
        assert!(err.to_string().contains("UDP bitrate"));

        config.merge_from_lookup(lookup_from(&[("TEST_PROTOCOLS", "tcp,udp")])).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_excessive_tick_count_invalid() {
        let mut config = CampaignConfig::default();
        config.latency.duration_seconds = 1e7;
        config.latency.interval_seconds = 0.001;
        let err = config.validate().unwrap_err();
        assert_eq!(err.category(), "CONFIG");
        assert_eq!(config.latency.tick_count(), crate::defaults::MAX_PROBE_TICKS);

        config.latency.duration_seconds = 1_000_000.0;
        config.latency.interval_seconds = 1.0;
        assert!(config.validate().is_ok());
        assert_eq!(config.latency.tick_count(), 1_000_000);
    }

    #[test]
    fn test_port_for_protocol() {
        let settings = ThroughputSettings::default();
        assert_eq!(settings.port_for(Protocol::Tcp), 5001);
        assert_eq!(settings.port_for(Protocol::Udp), 5002);
    }

    #[test]
    fn test_merge_from_lookup() {
        let mut config = CampaignConfig::default();
        config.merge_from_lookup(lookup_from(&[
            ("TEST_PROTOCOLS", "tcp, udp"),
            ("TEST_ITERATIONS", "2"),
            ("UDP_BITRATE", "20M"),
            ("MAX_LATENCY_MS", "75.5"),
            ("LOG_LEVEL", "debug"),
            ("ENABLE_COLOR", "false"),
        ])).unwrap();

        assert_eq!(config.throughput.protocols, vec![Protocol::Tcp, Protocol::Udp]);
        assert_eq!(config.throughput.iterations, 2);
        assert_eq!(config.throughput.udp_bitrate.as_deref(), Some("20M"));
        assert_eq!(config.thresholds.max_latency_ms, 75.5);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(!config.logging.enable_color);
    }

    #[test]
    fn test_merge_rejects_bad_values() {
        let mut config = CampaignConfig::default();
        assert!(config.merge_from_lookup(lookup_from(&[("TEST_ITERATIONS", "many")])).is_err());
        assert!(config.merge_from_lookup(lookup_from(&[("TEST_PROTOCOLS", "tcp,quic")])).is_err());
    }
}
