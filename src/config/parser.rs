//! Configuration assembly from defaults, environment and CLI arguments

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::CampaignConfig,
};

/// Builds the campaign configuration: defaults, then the .env file, then
/// environment variables, then CLI flags, validated once at the end
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Build the configuration from the real process environment
    pub fn parse(&self) -> Result<CampaignConfig> {
        EnvManager::load_env_file(self.cli.env_file.as_deref())?;
        self.parse_with_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration reading variables through `lookup`
    pub fn parse_with_lookup<F>(&self, lookup: F) -> Result<CampaignConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.cli.validate().map_err(AppError::config)?;

        let mut config = CampaignConfig::default();
        config.merge_from_lookup(lookup)?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut CampaignConfig) {
        let cli = &self.cli;

        if let Some(protocols) = &cli.protocols {
            config.throughput.protocols = protocols.clone();
        }
        if let Some(duration) = cli.duration {
            config.throughput.duration_seconds = duration;
        }
        if let Some(iterations) = cli.iterations {
            config.throughput.iterations = iterations;
        }
        if let Some(delay) = cli.delay {
            config.throughput.delay_between_iterations_seconds = delay;
        }
        if let Some(bitrate) = &cli.udp_bitrate {
            config.throughput.udp_bitrate = Some(bitrate.clone());
        }
        if cli.text_output {
            config.throughput.structured_output = false;
        }
        if let Some(binary) = &cli.iperf_binary {
            config.throughput.binary = binary.clone();
        }

        if let Some(duration) = cli.latency_duration {
            config.latency.duration_seconds = duration;
        }
        if let Some(interval) = cli.latency_interval {
            config.latency.interval_seconds = interval;
        }
        if let Some(port) = cli.latency_port {
            config.latency.port = port;
        }
        if let Some(size) = cli.packet_size {
            config.latency.packet_size = size;
        }

        if let Some(hosts) = cli.hosts {
            config.network.hosts = hosts;
        }
        if let Some(settle) = cli.settle {
            config.network.settle_seconds = settle;
        }

        if let Some(max_latency) = cli.max_latency {
            config.thresholds.max_latency_ms = max_latency;
        }
        if let Some(max_loss) = cli.max_loss {
            config.thresholds.max_packet_loss_percent = max_loss;
        }
        if let Some(min_throughput) = cli.min_throughput {
            config.thresholds.min_throughput_mbps = min_throughput;
        }

        if let Some(level) = cli.requested_log_level() {
            config.logging.level = level;
        }
        if let Some(format) = cli.log_format {
            config.logging.format = format;
        }
        if cli.no_color {
            config.logging.enable_color = false;
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<CampaignConfig> {
    ConfigParser::new(cli).parse()
}

/// One line per setting, for debug output
pub fn display_config_summary(config: &CampaignConfig) -> String {
    let protocols: Vec<&str> = config.throughput.protocols.iter().map(|p| p.as_str()).collect();

    [
        format!("Hosts: {} ({:?})", config.network.hosts, config.network.topology),
        format!("Protocols: {}", protocols.join(", ")),
        format!(
            "Throughput: {} x {}s, {}s apart",
            config.throughput.iterations,
            config.throughput.duration_seconds,
            config.throughput.delay_between_iterations_seconds
        ),
        format!(
            "Latency: {}s every {}s, {} byte probes on port {}",
            config.latency.duration_seconds,
            config.latency.interval_seconds,
            config.latency.packet_size,
            config.latency.port
        ),
        format!(
            "Thresholds: latency <= {}ms, loss <= {}%, throughput >= {}Mbps",
            config.thresholds.max_latency_ms,
            config.thresholds.max_packet_loss_percent,
            config.thresholds.min_throughput_mbps
        ),
        format!("Logging: {:?} / {:?}, color {}", config.logging.level, config.logging.format, config.logging.enable_color),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use crate::types::Protocol;
    use clap::Parser;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_environment() {
        let parser = ConfigParser::new(Cli::parse_from(["npc"]));
        let config = parser.parse_with_lookup(no_env).unwrap();
        assert_eq!(config, CampaignConfig::default());
    }

    #[test]
    fn test_cli_overrides_environment() {
        let cli = Cli::parse_from(["npc", "--iterations", "3", "--no-color", "--max-latency", "20"]);
        let config = ConfigParser::new(cli)
            .parse_with_lookup(|key| match key {
                "TEST_ITERATIONS" => Some("7".to_string()),
                "TEST_PROTOCOLS" => Some("udp".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.throughput.iterations, 3);
        assert_eq!(config.throughput.protocols, vec![Protocol::Udp]);
        assert_eq!(config.thresholds.max_latency_ms, 20.0);
        assert!(!config.logging.enable_color);
    }

    #[test]
    fn test_text_output_and_debug_flags() {
        let cli = Cli::parse_from(["npc", "--text-output", "--debug"]);
        let config = ConfigParser::new(cli).parse_with_lookup(no_env).unwrap();
        assert!(!config.throughput.structured_output);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_result_is_rejected() {
        let cli = Cli::parse_from(["npc", "--packet-size", "4"]);
        let err = ConfigParser::new(cli).parse_with_lookup(no_env).unwrap_err();
        assert_eq!(err.category(), "CONFIG");
    }

    #[test]
    fn test_bitrate_with_tcp_only_environment_is_rejected() {
        let cli = Cli::parse_from(["npc", "--udp-bitrate", "20M"]);
        let err = ConfigParser::new(cli)
            .parse_with_lookup(|key| (key == "TEST_PROTOCOLS").then(|| "tcp".to_string()))
            .unwrap_err();
        assert_eq!(err.category(), "CONFIG");

        let cli = Cli::parse_from(["npc", "--protocols", "udp", "--udp-bitrate", "20M"]);
        let config = ConfigParser::new(cli)
            .parse_with_lookup(|key| (key == "TEST_PROTOCOLS").then(|| "tcp".to_string()))
            .unwrap();
        assert_eq!(config.throughput.udp_bitrate.as_deref(), Some("20M"));
    }

    #[test]
    fn test_cli_conflict_is_config_error() {
        let cli = Cli::parse_from(["npc", "--debug", "--log-level", "info"]);
        assert!(ConfigParser::new(cli).parse_with_lookup(no_env).is_err());
    }

    #[test]
    fn test_config_summary() {
        let summary = display_config_summary(&CampaignConfig::default());
        assert!(summary.contains("Protocols: tcp"));
        assert!(summary.contains("Throughput: 5 x 60s, 10s apart"));
    }
}
