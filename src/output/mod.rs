//! Campaign result reporting
//!
//! The campaign hands its finished [`CampaignResult`] to a
//! [`CampaignReporter`]. The console reporter prints a summary with optional
//! colors; rendering to files is left to other reporters.

mod summary;

pub use summary::{SummaryFormatter, SummaryOptions};

use crate::error::{AppError, Result};
use crate::models::CampaignResult;
use async_trait::async_trait;
use std::io::Write;

/// Consumer of finished campaign results
#[async_trait]
pub trait CampaignReporter: Send + Sync {
    async fn report(&self, result: &CampaignResult) -> Result<()>;
}

/// Prints the campaign summary to stdout
pub struct ConsoleReporter {
    formatter: SummaryFormatter,
}

impl ConsoleReporter {
    pub fn new(enable_color: bool, verbose: bool) -> Self {
        Self {
            formatter: SummaryFormatter::new(SummaryOptions { enable_color, verbose }),
        }
    }
}

#[async_trait]
impl CampaignReporter for ConsoleReporter {
    async fn report(&self, result: &CampaignResult) -> Result<()> {
        let rendered = self.formatter.format(result)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", rendered)
            .map_err(|e| AppError::io(format!("Failed to write campaign summary: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Thresholds, ThroughputResult};
    use chrono::Utc;

    #[test]
    fn test_console_reporter_accepts_result() {
        let now = Utc::now();
        let result = CampaignResult::new(
            "20240101_120000".to_string(),
            now,
            now,
            vec![ThroughputResult::tcp(10, 940.0, 3)],
            Vec::new(),
            Thresholds::default(),
            Vec::new(),
            Vec::new(),
        );

        let reporter = ConsoleReporter::new(false, true);
        tokio_test::block_on(async {
            reporter.report(&result).await.unwrap();
        });
    }
}
