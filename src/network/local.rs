//! Loopback network provider
//!
//! Every endpoint is the local machine on 127.0.0.1 and commands run through
//! `tokio::process`. Link shaping is not emulated.

use super::{CommandLine, CommandOutput, Endpoint, ManagedProcess, NetworkHandle, NetworkProvider};
use crate::logging::Logger;
use crate::models::TopologyConfig;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;
use tokio::process::{Child, Command};

/// Provider whose hosts are all the local machine
pub struct LocalNetworkProvider {
    logger: Logger,
    address: IpAddr,
    active: Mutex<HashSet<String>>,
}

impl LocalNetworkProvider {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            active: Mutex::new(HashSet::new()),
        }
    }

    fn is_active(&self, handle: &NetworkHandle) -> bool {
        self.active
            .lock()
            .map(|active| active.contains(handle.id()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl NetworkProvider for LocalNetworkProvider {
    async fn acquire(&self, topology: &TopologyConfig) -> Result<NetworkHandle> {
        topology.validate()?;

        self.logger.warn("Local provider does not shape links; requested impairments are ignored")
            .field("latency_ms", topology.latency_ms)
            .field("packet_loss_percent", topology.packet_loss_percent)
            .field("bandwidth_mbps", topology.bandwidth_mbps)
            .log()
            .await;

        let handle = NetworkHandle::new(topology.clone());
        self.active
            .lock()
            .map_err(|_| AppError::internal("network registry lock poisoned"))?
            .insert(handle.id().to_string());

        self.logger.info(&format!("Acquired local network with {} hosts", topology.hosts))
            .field("network_id", handle.id())
            .field("topology", topology.topology)
            .field("switch", &topology.switch_name)
            .log()
            .await;

        Ok(handle)
    }

    async fn release(&self, handle: NetworkHandle) -> Result<()> {
        let removed = self.active
            .lock()
            .map_err(|_| AppError::internal("network registry lock poisoned"))?
            .remove(handle.id());

        if !removed {
            return Err(AppError::provisioning(format!("Network {} is not active", handle.id())));
        }

        self.logger.info("Released local network")
            .field("network_id", handle.id())
            .log()
            .await;
        Ok(())
    }

    async fn list_endpoints(&self, handle: &NetworkHandle) -> Result<Vec<Arc<dyn Endpoint>>> {
        if !self.is_active(handle) {
            return Err(AppError::provisioning(format!("Network {} is not active", handle.id())));
        }

        let endpoints = (1..=handle.topology().hosts)
            .map(|i| {
                Arc::new(LocalEndpoint::new(format!("h{}", i), self.address)) as Arc<dyn Endpoint>
            })
            .collect();
        Ok(endpoints)
    }

    async fn check_connectivity(&self, handle: &NetworkHandle) -> Result<()> {
        for endpoint in self.list_endpoints(handle).await? {
            let addr = SocketAddr::new(endpoint.ip_address(), 0);
            UdpSocket::bind(addr).await.map_err(|e| {
                AppError::provisioning(format!("Endpoint {} at {} is unreachable: {}", endpoint.name(), addr.ip(), e))
            })?;
        }

        self.logger.debug("Local connectivity check passed")
            .field("network_id", handle.id())
            .log()
            .await;
        Ok(())
    }
}

/// The local machine posing as one host
#[derive(Debug, Clone)]
pub struct LocalEndpoint {
    name: String,
    address: IpAddr,
}

impl LocalEndpoint {
    pub fn new(name: String, address: IpAddr) -> Self {
        Self { name, address }
    }

    fn command(command: &CommandLine) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        cmd
    }
}

#[async_trait]
impl Endpoint for LocalEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn ip_address(&self) -> IpAddr {
        self.address
    }

    async fn run_command(&self, command: &CommandLine) -> Result<CommandOutput> {
        let output = Self::command(command)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AppError::process(format!("Failed to run '{}' on {}: {}", command, self.name, e)))?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn spawn_process(&self, command: &CommandLine) -> Result<Box<dyn ManagedProcess>> {
        let child = Self::command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::process(format!("Failed to start '{}' on {}: {}", command, self.name, e)))?;

        Ok(Box::new(LocalProcess { child }))
    }
}

/// Background child process; killed when dropped
pub struct LocalProcess {
    child: Child,
}

#[async_trait]
impl ManagedProcess for LocalProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn terminate(&mut self) -> Result<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        self.child
            .kill()
            .await
            .map_err(|e| AppError::process(format!("Failed to terminate process: {}", e)))
    }

    async fn wait(&mut self) -> Result<Option<i32>> {
        let status = self.child
            .wait()
            .await
            .map_err(|e| AppError::process(format!("Failed to wait for process: {}", e)))?;
        Ok(status.code())
    }
}
