//! Network collaborator interfaces
//!
//! A campaign never builds the network itself. It asks a [`NetworkProvider`]
//! for a [`NetworkHandle`], resolves the endpoints behind it and drives
//! commands on them. Topology emulation lives behind these traits.

pub mod local;

pub use local::LocalNetworkProvider;

use crate::models::TopologyConfig;
use crate::types::Result;
use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

/// Token for an acquired network; released exactly once through its provider
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkHandle {
    id: String,
    topology: TopologyConfig,
}

impl NetworkHandle {
    pub fn new(topology: TopologyConfig) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            topology,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn topology(&self) -> &TopologyConfig {
        &self.topology
    }
}

/// Program plus arguments to run on an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Whether `flag` appears among the arguments
    pub fn has_arg(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// Value following `flag`, if any
    pub fn arg_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// A long-running process started on an endpoint
#[async_trait]
pub trait ManagedProcess: Send + Sync {
    /// OS process id, when known
    fn id(&self) -> Option<u32>;

    /// Stop the process; terminating an already exited process is not an error
    async fn terminate(&mut self) -> Result<()>;

    /// Wait for exit and return the exit code
    async fn wait(&mut self) -> Result<Option<i32>>;
}

/// One addressable host of the network
#[async_trait]
pub trait Endpoint: Send + Sync {
    fn name(&self) -> &str;

    fn ip_address(&self) -> IpAddr;

    /// Run `command` to completion and capture its output
    async fn run_command(&self, command: &CommandLine) -> Result<CommandOutput>;

    /// Start `command` in the background
    async fn spawn_process(&self, command: &CommandLine) -> Result<Box<dyn ManagedProcess>>;
}

/// Provisioning collaborator that owns the network's lifecycle
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    async fn acquire(&self, topology: &TopologyConfig) -> Result<NetworkHandle>;

    async fn release(&self, handle: NetworkHandle) -> Result<()>;

    /// Endpoints in host order; the campaign uses the first two
    async fn list_endpoints(&self, handle: &NetworkHandle) -> Result<Vec<Arc<dyn Endpoint>>>;

    /// Best-effort reachability check between the endpoints
    async fn check_connectivity(&self, handle: &NetworkHandle) -> Result<()>;
}
