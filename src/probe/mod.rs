//! Round-trip-time probe
//!
//! A timestamp-echo protocol over UDP. The responder runs on its own task on
//! the server side; the sampler sends one request per tick from the client
//! side and computes RTT, jitter and loss from the echoed timestamps.

pub mod responder;
pub mod sampler;
pub mod wire;

pub use responder::{ResponderStats, RttResponder};
pub use sampler::{RecvOutcome, RttSampler};

use crate::logging::Logger;
use crate::models::{LatencyResult, LatencySettings};
use crate::types::Result;
use std::net::{IpAddr, SocketAddr};

/// Responder and sampler bound to one set of latency settings
pub struct RttProbe {
    responder: RttResponder,
    sampler: RttSampler,
}

impl RttProbe {
    pub fn new(settings: &LatencySettings, logger: Logger) -> Result<Self> {
        let bind_addr = SocketAddr::new(settings.bind_ip()?, settings.port);
        Ok(Self {
            responder: RttResponder::new(bind_addr, settings.poll_interval(), logger.named("RTT_RESPONDER")),
            sampler: RttSampler::new(settings, logger.named("RTT_SAMPLER")),
        })
    }

    /// Start the responder; idempotent
    pub async fn start_responder(&mut self) -> Result<SocketAddr> {
        self.responder.start().await
    }

    /// Stop the responder; `None` when it was not running
    pub async fn stop_responder(&mut self) -> Option<ResponderStats> {
        self.responder.stop().await
    }

    pub fn responder_addr(&self) -> Option<SocketAddr> {
        self.responder.local_addr()
    }

    /// Measure the path to the responder reached at `server_ip`.
    ///
    /// Starts the responder first when needed and targets the port it
    /// actually bound, so an ephemeral port works too.
    pub async fn run_test(&mut self, server_ip: IpAddr) -> Result<LatencyResult> {
        let bound = self.responder.start_if_stopped().await?;
        self.sampler.run(SocketAddr::new(server_ip, bound.port())).await
    }
}
