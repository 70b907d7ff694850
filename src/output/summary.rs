//! Human-readable campaign summary

use crate::error::{AppError, Result};
use crate::models::CampaignResult;
use colored::{Color, ColoredString, Colorize};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions {
    pub enable_color: bool,
    /// Include one line per individual result
    pub verbose: bool,
}

/// Renders a [`CampaignResult`] as a text block
#[derive(Debug, Clone)]
pub struct SummaryFormatter {
    options: SummaryOptions,
}

impl SummaryFormatter {
    pub fn new(options: SummaryOptions) -> Self {
        Self { options }
    }

    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    pub fn format(&self, result: &CampaignResult) -> Result<String> {
        self.render(result)
            .map_err(|e| AppError::io(format!("Failed to format campaign summary: {}", e)))
    }

    fn render(&self, result: &CampaignResult) -> std::result::Result<String, std::fmt::Error> {
        let mut output = String::new();
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(output, "{}", rule)?;
        writeln!(output, "{}", self.bold("CAMPAIGN SUMMARY"))?;
        writeln!(output, "{}", rule)?;
        writeln!(output, "Campaign ID:      {}", result.campaign_id)?;
        writeln!(output, "Duration:         {:.2}s", result.duration_seconds)?;

        let status = if result.passed {
            self.colorize("PASSED", Color::Green)
        } else {
            self.colorize("FAILED", Color::Red)
        };
        writeln!(output, "Status:           {}", status)?;
        writeln!(output, "Throughput tests: {}", result.throughput_results.len())?;
        writeln!(output, "Latency tests:    {}", result.latency_results.len())?;

        if self.options.verbose {
            for (i, r) in result.throughput_results.iter().enumerate() {
                let mut line = format!("  [{}] {} {:.2} Mbps", i + 1, r.protocol, r.throughput_mbps);
                if let Some(retransmissions) = r.retransmissions {
                    line.push_str(&format!(", {} retransmits", retransmissions));
                }
                if let (Some(loss), Some(jitter)) = (r.packet_loss_percent, r.jitter_ms) {
                    line.push_str(&format!(", {:.2}% loss, {:.3} ms jitter", loss, jitter));
                }
                writeln!(output, "{}", line)?;
            }
            for r in &result.latency_results {
                writeln!(
                    output,
                    "  RTT min/mean/max {:.2}/{:.2}/{:.2} ms, jitter {:.2} ms, loss {:.2}% ({}/{})",
                    r.rtt_min_ms, r.rtt_mean_ms, r.rtt_max_ms, r.jitter_ms,
                    r.packet_loss_percent, r.packets_received, r.packets_sent
                )?;
            }
        }

        if !result.phase_errors.is_empty() {
            writeln!(output)?;
            writeln!(output, "{}", self.colorize("Execution errors:", Color::Red))?;
            for error in &result.phase_errors {
                writeln!(output, "  - [{}/{}] {}", error.source, error.category, error.message)?;
            }
        }

        if !result.violations.is_empty() {
            writeln!(output)?;
            writeln!(output, "{}", self.colorize("Threshold violations:", Color::Yellow))?;
            for violation in &result.violations {
                writeln!(output, "  - {}", violation.message)?;
            }
        }

        write!(output, "{}", rule)?;
        Ok(output)
    }
}
