//! iperf3 output parsing
//!
//! JSON (`-J`) output is the primary format. The text parser is a fallback
//! for builds without JSON support and only recovers the throughput.

use crate::models::ThroughputResult;
use crate::types::{AppError, Protocol, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
struct IperfReport {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    end: Option<IperfEnd>,
}

#[derive(Debug, Deserialize)]
struct IperfEnd {
    #[serde(default)]
    sum_sent: Option<IperfSum>,
    #[serde(default)]
    sum_received: Option<IperfSum>,
    #[serde(default)]
    sum: Option<IperfSum>,
}

#[derive(Debug, Default, Deserialize)]
struct IperfSum {
    #[serde(default)]
    bits_per_second: Option<f64>,
    #[serde(default)]
    bytes: Option<u64>,
    #[serde(default)]
    retransmits: Option<u64>,
    #[serde(default)]
    lost_percent: Option<f64>,
    #[serde(default)]
    jitter_ms: Option<f64>,
}

/// Parse `iperf3 -J` output.
///
/// A report carrying an `error` field is a test execution error; anything
/// else that does not have the expected shape is a parse error.
pub fn parse_json(output: &str, protocol: Protocol, duration_seconds: u64) -> Result<ThroughputResult> {
    let report: IperfReport = serde_json::from_str(output.trim())?;

    if let Some(error) = report.error {
        return Err(AppError::test_execution(format!("iperf3 reported: {}", error)));
    }

    let end = report.end.ok_or_else(|| AppError::parse("iperf3 report has no 'end' section"))?;

    match protocol {
        Protocol::Tcp => {
            let sent = end.sum_sent.unwrap_or_default();
            let received = end.sum_received;
            let bits_per_second = received
                .as_ref()
                .and_then(|r| r.bits_per_second)
                .or(sent.bits_per_second)
                .ok_or_else(|| AppError::parse("iperf3 TCP report has no bits_per_second summary"))?;

            Ok(ThroughputResult::tcp(duration_seconds, bits_per_second / 1e6, sent.retransmits.unwrap_or(0))
                .with_bytes(sent.bytes, received.and_then(|r| r.bytes)))
        }
        Protocol::Udp => {
            let sum = end.sum.ok_or_else(|| AppError::parse("iperf3 UDP report has no 'end.sum' section"))?;
            let bits_per_second = sum.bits_per_second
                .ok_or_else(|| AppError::parse("iperf3 UDP report has no bits_per_second"))?;

            Ok(ThroughputResult::udp(
                duration_seconds,
                bits_per_second / 1e6,
                sum.lost_percent.unwrap_or(0.0),
                sum.jitter_ms.unwrap_or(0.0),
            )
            .with_bytes(sum.bytes, sum.bytes))
        }
    }
}

fn rate_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*([kmg]?)bits/sec"))
        .as_ref()
        .map_err(|e| AppError::internal(format!("invalid rate pattern: {}", e)))
}

/// Parse human-readable iperf3 output.
///
/// The last `<value> <unit>bits/sec` token wins, which is the receiver
/// summary line on a normal run.
pub fn parse_text(output: &str, protocol: Protocol, duration_seconds: u64) -> Result<ThroughputResult> {
    let captures = rate_pattern()?
        .captures_iter(output)
        .last()
        .ok_or_else(|| AppError::parse("no '<value> <unit>bits/sec' token in iperf3 output"))?;

    let value: f64 = captures[1].parse()?;
    let mbps = match captures[2].to_ascii_lowercase().as_str() {
        "g" => value * 1000.0,
        "m" => value,
        "k" => value / 1000.0,
        _ => value / 1e6,
    };

    Ok(ThroughputResult {
        protocol,
        duration_seconds,
        throughput_mbps: mbps,
        retransmissions: None,
        packet_loss_percent: None,
        jitter_ms: None,
        bytes_sent: None,
        bytes_received: None,
    })
}
