//! Campaign orchestration
//!
//! A [`Campaign`] acquires a network, runs the throughput and latency phases
//! against its first two endpoints, always releases the network, scores the
//! results and hands the consolidated [`CampaignResult`] to a reporter.
//!
//! Each phase is isolated: an error or panic inside one is recorded as a
//! [`PhaseError`] and the run carries on. `run` itself never fails.

pub mod validator;

pub use validator::ThresholdValidator;

use crate::error::ErrorContext;
use crate::logging::Logger;
use crate::models::{CampaignConfig, CampaignResult, LatencyResult, PhaseError, ThroughputResult};
use crate::network::{Endpoint, NetworkHandle, NetworkProvider};
use crate::output::CampaignReporter;
use crate::probe::RttProbe;
use crate::throughput::ThroughputDriver;
use crate::types::{AppError, CampaignPhase, ErrorSource, Result};
use chrono::{Local, Utc};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Format of campaign identifiers, applied to the local start time
pub const CAMPAIGN_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One orchestrated measurement run
pub struct Campaign {
    config: CampaignConfig,
    provider: Arc<dyn NetworkProvider>,
    reporter: Option<Arc<dyn CampaignReporter>>,
    logger: Logger,
    phases: Vec<CampaignPhase>,
}

impl Campaign {
    pub fn new(config: CampaignConfig, provider: Arc<dyn NetworkProvider>, logger: Logger) -> Self {
        Self {
            config,
            provider,
            reporter: None,
            logger,
            phases: vec![CampaignPhase::Idle],
        }
    }

    /// Hand finished results to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn CampaignReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    /// Every phase entered so far, in order
    pub fn phase_history(&self) -> &[CampaignPhase] {
        &self.phases
    }

    pub fn current_phase(&self) -> CampaignPhase {
        self.phases.last().copied().unwrap_or(CampaignPhase::Idle)
    }

    async fn enter(&mut self, phase: CampaignPhase) {
        self.phases.push(phase);
        self.logger.debug(&format!("Campaign phase: {}", phase.as_str()))
            .field("phase", phase.as_str())
            .log()
            .await;
    }

    /// Run the whole campaign and return its result.
    pub async fn run(&mut self) -> CampaignResult {
        self.phases = vec![CampaignPhase::Idle];

        let start_time = Utc::now();
        let campaign_id = start_time.with_timezone(&Local).format(CAMPAIGN_ID_FORMAT).to_string();

        self.logger.add_context_field("campaign_id", &campaign_id).await;
        let correlation_id = self.logger.start_operation("campaign").await;
        self.logger.info(&format!("Starting test campaign {}", campaign_id)).log().await;

        let mut phase_errors = Vec::new();
        let mut throughput_results = Vec::new();
        let mut latency_results = Vec::new();

        self.enter(CampaignPhase::NetworkStarting).await;
        let handle = match guarded(self.start_network()).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                self.record(&mut phase_errors, ErrorSource::Network, &e).await;
                None
            }
        };

        if let Some(handle) = &handle {
            match guarded(self.resolve_endpoints(handle)).await {
                Ok((server, client)) => {
                    self.enter(CampaignPhase::NetworkReady).await;

                    self.enter(CampaignPhase::RunningThroughput).await;
                    let outcome = guarded(self.run_throughput_phase(&server, &client, &mut throughput_results)).await;
                    if let Err(e) = outcome {
                        self.record(&mut phase_errors, ErrorSource::Throughput, &e).await;
                    }

                    self.enter(CampaignPhase::RunningLatency).await;
                    match guarded(self.run_latency_phase(&server)).await {
                        Ok(result) => latency_results.push(result),
                        Err(e) => self.record(&mut phase_errors, ErrorSource::Latency, &e).await,
                    }
                }
                Err(e) => self.record(&mut phase_errors, ErrorSource::Network, &e).await,
            }
        }

        self.enter(CampaignPhase::NetworkTeardown).await;
        if let Some(handle) = handle {
            self.stop_network(handle).await;
        }

        self.enter(CampaignPhase::Validating).await;
        let violations = ThresholdValidator::new(self.config.thresholds.clone())
            .validate(&throughput_results, &latency_results);

        let result = CampaignResult::new(
            campaign_id,
            start_time,
            Utc::now(),
            throughput_results,
            latency_results,
            self.config.thresholds.clone(),
            phase_errors,
            violations,
        );

        if result.passed {
            self.logger.info("Campaign passed all threshold checks").log().await;
        } else {
            self.logger.warn("Campaign failed")
                .field("phase_errors", result.phase_errors.len())
                .field("violations", result.violations.len())
                .log()
                .await;
        }

        if let Some(reporter) = self.reporter.clone() {
            if let Err(e) = reporter.report(&result).await {
                self.logger.error(&format!("Reporter failed: {}", e))
                    .error_info(&e)
                    .log()
                    .await;
            }
        }
        self.enter(CampaignPhase::ReportingDone).await;

        self.logger.end_operation(&correlation_id, "campaign", result.passed).await;
        self.enter(CampaignPhase::Complete).await;
        result
    }

    async fn record(&self, errors: &mut Vec<PhaseError>, source: ErrorSource, error: &AppError) {
        self.logger.error(&format!("{} phase failed: {}", source, error))
            .field("source", source)
            .error_info(error)
            .log()
            .await;
        errors.push(PhaseError::from_error(source, error));
    }

    /// Acquire the network, let it settle and check reachability
    async fn start_network(&self) -> Result<NetworkHandle> {
        let topology = &self.config.network;
        self.logger.info("Starting network").log().await;
        let handle = self.provider.acquire(topology).await?;

        if !topology.settle_time().is_zero() {
            tokio::time::sleep(topology.settle_time()).await;
        }

        // Unreachable hosts will show up as test failures
        if let Err(e) = self.provider.check_connectivity(&handle).await {
            crate::log_warn!(self.logger, "Connectivity check failed: {}", e);
        }

        Ok(handle)
    }

    async fn stop_network(&self, handle: NetworkHandle) {
        crate::log_info!(self.logger, "Stopping network");
        match AssertUnwindSafe(self.provider.release(handle)).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.logger.error(&format!("Failed to release network: {}", e))
                    .error_info(&e)
                    .log()
                    .await;
            }
            Err(panic) => {
                crate::log_error!(self.logger, "Network release panicked: {}", panic_message(panic.as_ref()));
            }
        }
    }

    /// Server and client endpoints: the first two hosts
    async fn resolve_endpoints(&self, handle: &NetworkHandle) -> Result<(Arc<dyn Endpoint>, Arc<dyn Endpoint>)> {
        let mut endpoints = self.provider.list_endpoints(handle).await?.into_iter();
        match (endpoints.next(), endpoints.next()) {
            (Some(server), Some(client)) => Ok((server, client)),
            _ => Err(AppError::config("At least 2 endpoints are required for testing")),
        }
    }

    /// Every configured protocol in turn; stops at the first failing one
    async fn run_throughput_phase(
        &self,
        server: &Arc<dyn Endpoint>,
        client: &Arc<dyn Endpoint>,
        results: &mut Vec<ThroughputResult>,
    ) -> Result<()> {
        let settings = &self.config.throughput;

        for &protocol in &settings.protocols {
            self.logger.info(&format!("Running {} throughput tests", protocol)).log().await;

            let mut driver = ThroughputDriver::new(
                server.clone(),
                client.clone(),
                settings.port_for(protocol),
                settings,
                self.logger.named("THROUGHPUT"),
            );

            let outcome = driver
                .run_multiple(protocol, settings.duration_seconds, settings.iterations, settings.iteration_delay())
                .await;

            if let Err(e) = driver.stop_responder().await {
                crate::log_warn!(self.logger, "Failed to stop iperf3 server: {}", e);
            }

            results.extend(outcome.with_context(|| format!("{} tests failed", protocol))?);
        }

        Ok(())
    }

    async fn run_latency_phase(&self, server: &Arc<dyn Endpoint>) -> Result<LatencyResult> {
        self.logger.info("Running latency tests").log().await;

        let mut probe = RttProbe::new(&self.config.latency, self.logger.named("LATENCY"))?;
        probe.start_responder().await.context("Starting latency responder")?;
        let outcome = probe.run_test(server.ip_address()).await;
        probe.stop_responder().await;
        outcome
    }
}

/// Run a phase body, turning a panic into an internal error
async fn guarded<T, F>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(AppError::internal(format!("phase panicked: {}", panic_message(panic.as_ref())))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
