//! Throughput testing through an external iperf3 process
//!
//! The driver starts one iperf3 server on the server endpoint, reuses it for
//! every client run, and normalizes each run's output into a
//! [`ThroughputResult`].

pub mod parser;

use crate::error::ErrorContext;
use crate::logging::Logger;
use crate::models::{ThroughputResult, ThroughputSettings};
use crate::network::{CommandLine, Endpoint, ManagedProcess};
use crate::types::{AppError, Protocol, Result};
use std::sync::Arc;
use std::time::Duration;

/// Drives iperf3 between a server and a client endpoint on one port
pub struct ThroughputDriver {
    server: Arc<dyn Endpoint>,
    client: Arc<dyn Endpoint>,
    port: u16,
    binary: String,
    udp_bitrate: Option<String>,
    structured_output: bool,
    responder_settle: Duration,
    logger: Logger,
    responder: Option<Box<dyn ManagedProcess>>,
}

impl ThroughputDriver {
    pub fn new(
        server: Arc<dyn Endpoint>,
        client: Arc<dyn Endpoint>,
        port: u16,
        settings: &ThroughputSettings,
        logger: Logger,
    ) -> Self {
        Self {
            server,
            client,
            port,
            binary: settings.binary.clone(),
            udp_bitrate: settings.udp_bitrate.clone(),
            structured_output: settings.structured_output,
            responder_settle: settings.responder_settle(),
            logger,
            responder: None,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_responder_running(&self) -> bool {
        self.responder.is_some()
    }

    fn server_command(&self) -> CommandLine {
        CommandLine::new(&self.binary)
            .arg("-s")
            .arg("-p")
            .arg(self.port.to_string())
    }

    fn client_command(
        &self,
        protocol: Protocol,
        duration_seconds: u64,
        target_bitrate: Option<&str>,
        structured_output: bool,
    ) -> CommandLine {
        let mut command = CommandLine::new(&self.binary)
            .arg("-c")
            .arg(self.server.ip_address().to_string())
            .arg("-p")
            .arg(self.port.to_string())
            .arg("-t")
            .arg(duration_seconds.to_string());

        if protocol == Protocol::Udp {
            command = command.arg("-u");
            if let Some(bitrate) = target_bitrate {
                command = command.arg("-b").arg(bitrate);
            }
        }

        if structured_output {
            command = command.arg("-J");
        }

        command
    }

    /// Launch the iperf3 server; a second call only warns
    pub async fn start_responder(&mut self, protocol: Protocol) -> Result<()> {
        if self.responder.is_some() {
            self.logger.warn("iperf3 server already started")
                .field("port", self.port)
                .log()
                .await;
            return Ok(());
        }

        let command = self.server_command();
        self.logger.info(&format!("Starting iperf3 server on {}:{}", self.server.name(), self.port))
            .field("protocol", protocol)
            .field("command", command.to_string())
            .log()
            .await;

        let process = self.server.spawn_process(&command).await
            .with_context(|| format!("Starting iperf3 server on port {}", self.port))?;
        self.responder = Some(process);

        if !self.responder_settle.is_zero() {
            tokio::time::sleep(self.responder_settle).await;
        }
        Ok(())
    }

    /// Terminate the iperf3 server and wait for it; no-op when not running
    pub async fn stop_responder(&mut self) -> Result<()> {
        let Some(mut process) = self.responder.take() else {
            return Ok(());
        };

        process.terminate().await?;
        let exit_code = process.wait().await?;

        self.logger.info("iperf3 server stopped")
            .field("port", self.port)
            .field("exit_code", exit_code)
            .log()
            .await;
        Ok(())
    }

    /// One client run; starts the server first when needed.
    ///
    /// Output that cannot be interpreted is a parse error, an iperf3-reported
    /// failure is a test execution error, and a client that produced no
    /// output at all is a process error.
    pub async fn run_test(
        &mut self,
        protocol: Protocol,
        duration_seconds: u64,
        target_bitrate: Option<&str>,
        structured_output: bool,
    ) -> Result<ThroughputResult> {
        if self.responder.is_none() {
            self.start_responder(protocol).await?;
        }

        let command = self.client_command(protocol, duration_seconds, target_bitrate, structured_output);
        self.logger.info(&format!("Running iperf3 {} test for {}s", protocol, duration_seconds))
            .field("client", self.client.name())
            .field("command", command.to_string())
            .log()
            .await;

        let output = self.client.run_command(&command).await?;

        if !output.success() && output.stdout.trim().is_empty() {
            return Err(AppError::process(format!(
                "iperf3 client exited with {:?}: {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }

        let parsed = if structured_output {
            parser::parse_json(&output.stdout, protocol, duration_seconds)
        } else {
            parser::parse_text(&output.stdout, protocol, duration_seconds)
        };

        let result = match parsed {
            Ok(result) => result,
            Err(e) => {
                self.logger.error(&format!("iperf3 {} test failed: {}", protocol, e))
                    .error_info(&e)
                    .log()
                    .await;
                return Err(e);
            }
        };

        self.logger.info(&format!("iperf3 {} test finished: {:.2} Mbps", protocol, result.throughput_mbps))
            .throughput(&result)
            .log()
            .await;

        Ok(result)
    }

    /// Run `iterations` tests back to back with `delay` between them.
    ///
    /// The first failing iteration aborts the series.
    pub async fn run_multiple(
        &mut self,
        protocol: Protocol,
        duration_seconds: u64,
        iterations: u32,
        delay: Duration,
    ) -> Result<Vec<ThroughputResult>> {
        let bitrate = self.udp_bitrate.clone();
        let structured_output = self.structured_output;
        let mut results = Vec::with_capacity(iterations as usize);

        for i in 0..iterations {
            self.logger.info(&format!("Iteration {}/{}", i + 1, iterations))
                .field("protocol", protocol)
                .log()
                .await;

            let result = self.run_test(protocol, duration_seconds, bitrate.as_deref(), structured_output).await?;
            results.push(result);

            if i + 1 < iterations && !delay.is_zero() {
                self.logger.debug(&format!("Waiting {}s before next iteration", delay.as_secs_f64()))
                    .log()
                    .await;
                tokio::time::sleep(delay).await;
            }
        }

        Ok(results)
    }
}
