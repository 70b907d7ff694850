//! Shared test doubles for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use netperf_campaign::{
    error::{AppError, Result},
    logging::{Logger, MemorySink},
    models::{CampaignConfig, CampaignResult, TopologyConfig},
    network::{CommandLine, CommandOutput, Endpoint, ManagedProcess, NetworkHandle, NetworkProvider},
    output::CampaignReporter,
    types::Protocol,
};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TCP_REPORT: &str = r#"{
    "start": {"version": "iperf 3.12"},
    "end": {
        "sum_sent": {"bits_per_second": 950000000.0, "bytes": 1187500000, "retransmits": 12},
        "sum_received": {"bits_per_second": 940000000.0, "bytes": 1175000000}
    }
}"#;

pub const UDP_REPORT: &str = r#"{
    "end": {"sum": {"bits_per_second": 10000000.0, "lost_percent": 0.5, "jitter_ms": 0.02, "bytes": 12500000}}
}"#;

pub fn memory_logger(name: &str) -> (Logger, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (Logger::with_sink(name, sink.clone()), sink)
}

pub fn stdout(text: &str) -> Result<CommandOutput> {
    Ok(CommandOutput {
        exit_code: Some(0),
        stdout: text.to_string(),
        stderr: String::new(),
    })
}

/// Configuration that finishes in well under a second on loopback
pub fn quick_config() -> CampaignConfig {
    let mut config = CampaignConfig::default();

    config.network.settle_seconds = 0.0;

    config.throughput.protocols = vec![Protocol::Tcp];
    config.throughput.duration_seconds = 1;
    config.throughput.iterations = 1;
    config.throughput.delay_between_iterations_seconds = 0;
    config.throughput.responder_settle_seconds = 0.0;

    config.latency.port = 0;
    config.latency.bind_address = "127.0.0.1".to_string();
    config.latency.duration_seconds = 0.3;
    config.latency.interval_seconds = 0.1;
    config.latency.receive_timeout_seconds = 0.5;
    config.latency.poll_interval_seconds = 0.05;

    config
}

type Script = dyn Fn(&CommandLine) -> Result<CommandOutput> + Send + Sync;

/// Process that only records whether it was terminated
pub struct MockProcess {
    terminated: Arc<AtomicBool>,
}

#[async_trait]
impl ManagedProcess for MockProcess {
    fn id(&self) -> Option<u32> {
        None
    }

    async fn terminate(&mut self) -> Result<()> {
        self.terminated.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn wait(&mut self) -> Result<Option<i32>> {
        Ok(Some(0))
    }
}

/// Endpoint on 127.0.0.1 whose commands are answered by a script
pub struct MockEndpoint {
    name: String,
    script: Box<Script>,
    commands: Mutex<Vec<CommandLine>>,
    spawned: Mutex<Vec<CommandLine>>,
    terminated: Arc<AtomicBool>,
}

impl MockEndpoint {
    pub fn new<F>(name: &str, script: F) -> Self
    where
        F: Fn(&CommandLine) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            script: Box::new(script),
            commands: Mutex::new(Vec::new()),
            spawned: Mutex::new(Vec::new()),
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Endpoint answering every command with `output` on stdout
    pub fn replying(name: &str, output: &'static str) -> Self {
        Self::new(name, move |_| stdout(output))
    }

    pub fn commands(&self) -> Vec<CommandLine> {
        self.commands.lock().unwrap().clone()
    }

    pub fn spawned(&self) -> Vec<CommandLine> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn was_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Endpoint for MockEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn ip_address(&self) -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    async fn run_command(&self, command: &CommandLine) -> Result<CommandOutput> {
        self.commands.lock().unwrap().push(command.clone());
        (self.script)(command)
    }

    async fn spawn_process(&self, command: &CommandLine) -> Result<Box<dyn ManagedProcess>> {
        self.spawned.lock().unwrap().push(command.clone());
        self.terminated.store(false, Ordering::SeqCst);
        Ok(Box::new(MockProcess {
            terminated: self.terminated.clone(),
        }))
    }
}

/// Provider handing out a fixed set of endpoints
pub struct MockProvider {
    endpoints: Vec<Arc<MockEndpoint>>,
    fail_acquire: bool,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl MockProvider {
    pub fn new(endpoints: Vec<Arc<MockEndpoint>>) -> Self {
        Self {
            endpoints,
            fail_acquire: false,
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// Provider whose acquire always fails
    pub fn failing() -> Self {
        Self {
            fail_acquire: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkProvider for MockProvider {
    async fn acquire(&self, topology: &TopologyConfig) -> Result<NetworkHandle> {
        if self.fail_acquire {
            return Err(AppError::provisioning("switch s1 could not be created"));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(NetworkHandle::new(topology.clone()))
    }

    async fn release(&self, _handle: NetworkHandle) -> Result<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_endpoints(&self, _handle: &NetworkHandle) -> Result<Vec<Arc<dyn Endpoint>>> {
        Ok(self.endpoints.iter().map(|e| e.clone() as Arc<dyn Endpoint>).collect())
    }

    async fn check_connectivity(&self, _handle: &NetworkHandle) -> Result<()> {
        Ok(())
    }
}

/// Reporter that keeps every result it was given
#[derive(Default)]
pub struct MemoryReporter {
    results: Mutex<Vec<CampaignResult>>,
}

impl MemoryReporter {
    pub fn results(&self) -> Vec<CampaignResult> {
        self.results.lock().unwrap().clone()
    }
}

#[async_trait]
impl CampaignReporter for MemoryReporter {
    async fn report(&self, result: &CampaignResult) -> Result<()> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}
