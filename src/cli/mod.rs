//! Command-line interface

use crate::logging::{LogFormat, LogLevel};
use crate::types::Protocol;
use clap::Parser;
use std::path::PathBuf;

/// Network performance campaign runner: throughput, latency, jitter and loss
/// between two endpoints, scored against thresholds
#[derive(Parser, Debug, Clone)]
#[command(name = "npc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Throughput protocols to test (comma-separated: tcp,udp)
    #[arg(long, value_delimiter = ',')]
    pub protocols: Option<Vec<Protocol>>,

    /// Duration of each throughput test in seconds
    #[arg(short = 't', long, value_parser = parse_seconds)]
    pub duration: Option<u64>,

    /// Throughput iterations per protocol
    #[arg(short = 'n', long)]
    pub iterations: Option<u32>,

    /// Pause between throughput iterations in seconds
    #[arg(long)]
    pub delay: Option<u64>,

    /// Target bitrate for UDP tests (e.g. 10M)
    #[arg(long)]
    pub udp_bitrate: Option<String>,

    /// Ask iperf3 for plain-text output instead of JSON
    #[arg(long)]
    pub text_output: bool,

    /// iperf3 executable
    #[arg(long, value_name = "PATH")]
    pub iperf_binary: Option<String>,

    /// Duration of the latency test in seconds
    #[arg(long)]
    pub latency_duration: Option<f64>,

    /// Interval between latency probes in seconds
    #[arg(long)]
    pub latency_interval: Option<f64>,

    /// UDP port of the latency responder (0 picks a free port)
    #[arg(long)]
    pub latency_port: Option<u16>,

    /// Latency probe packet size in bytes
    #[arg(long)]
    pub packet_size: Option<usize>,

    /// Number of hosts to request from the network provider
    #[arg(long)]
    pub hosts: Option<u32>,

    /// Seconds to wait for the network to settle after it is acquired
    #[arg(long)]
    pub settle: Option<f64>,

    /// Maximum acceptable mean latency in ms
    #[arg(long)]
    pub max_latency: Option<f64>,

    /// Maximum acceptable packet loss in percent
    #[arg(long)]
    pub max_loss: Option<f64>,

    /// Minimum acceptable throughput in Mbps
    #[arg(long)]
    pub min_throughput: Option<f64>,

    /// Environment file to load instead of ./.env
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Log format (console, json, compact)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// List every individual result in the summary
    #[arg(long)]
    pub verbose: bool,

    /// Shorthand for --log-level debug
    #[arg(long)]
    pub debug: bool,

    /// Print the campaign result as JSON instead of the summary
    #[arg(long)]
    pub json: bool,

    /// List the supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,

    /// Write a commented example .env file and exit
    #[arg(long, value_name = "FILE")]
    pub write_env_example: Option<PathBuf>,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.debug && self.log_level.is_some() {
            return Err("Cannot specify both --debug and --log-level".to_string());
        }

        Ok(())
    }

    /// Whether the invocation only prints help material instead of running
    pub fn is_info_request(&self) -> bool {
        self.env_help || self.write_env_example.is_some()
    }

    /// Log level requested on the command line, if any
    pub fn requested_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            Some(LogLevel::Debug)
        } else {
            self.log_level
        }
    }
}

/// Parse a positive number of seconds
fn parse_seconds(s: &str) -> Result<u64, String> {
    if s.starts_with('+') {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else {
                Ok(secs)
            }
        })
}
