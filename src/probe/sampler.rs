//! Client side of the RTT probe

use super::wire;
use crate::logging::Logger;
use crate::models::{LatencyResult, LatencySettings};
use crate::types::{AppError, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;

/// What one tick's wait for a reply produced
#[derive(Debug, Clone, PartialEq)]
pub enum RecvOutcome {
    /// Matching reply; RTT in milliseconds
    Reply(f64),
    Timeout,
    /// Receive error or unusable reply
    Failed(String),
}

/// Fixed-rate prober that turns echoed timestamps into a [`LatencyResult`]
#[derive(Debug, Clone)]
pub struct RttSampler {
    ticks: u32,
    interval: Duration,
    receive_timeout: Duration,
    packet_size: usize,
    logger: Logger,
}

impl RttSampler {
    pub fn new(settings: &LatencySettings, logger: Logger) -> Self {
        Self {
            ticks: settings.tick_count(),
            interval: settings.interval(),
            receive_timeout: settings.receive_timeout(),
            packet_size: settings.packet_size,
            logger,
        }
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Probe `target` once per tick and summarize the samples.
    ///
    /// Only failing to open the client socket is an error. Lost, late and
    /// malformed replies lower the received count instead.
    pub async fn run(&self, target: SocketAddr) -> Result<LatencyResult> {
        let local: SocketAddr = match target.ip() {
            IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).await.map_err(|e| {
            AppError::transport(format!("Failed to bind probe socket: {}", e))
        })?;

        self.logger.info(&format!("Starting latency test against {}", target))
            .field("ticks", self.ticks)
            .field("interval_ms", self.interval.as_millis() as u64)
            .field("packet_size", self.packet_size)
            .log()
            .await;

        let mut packets_sent: u64 = 0;
        let mut samples = Vec::new();
        let mut buf = vec![0u8; wire::MAX_DATAGRAM];

        for tick in 0..self.ticks {
            let client_timestamp = wire::now_seconds();
            let request = wire::encode_request(client_timestamp, self.packet_size);

            match socket.send_to(&request, target).await {
                Ok(_) => {
                    packets_sent += 1;
                    match self.await_reply(&socket, client_timestamp, &mut buf).await {
                        RecvOutcome::Reply(rtt) => samples.push(rtt),
                        RecvOutcome::Timeout => {
                            self.logger.warn("Timed out waiting for probe reply")
                                .field("tick", tick)
                                .log()
                                .await;
                        }
                        RecvOutcome::Failed(reason) => {
                            self.logger.warn(&format!("Probe reply unusable: {}", reason))
                                .field("tick", tick)
                                .log()
                                .await;
                        }
                    }
                }
                Err(e) => {
                    self.logger.error(&format!("Failed to send probe: {}", e))
                        .field("tick", tick)
                        .log()
                        .await;
                }
            }

            if tick + 1 < self.ticks {
                tokio::time::sleep(self.interval).await;
            }
        }

        if samples.is_empty() {
            crate::log_warn!(self.logger, "No latency samples received");
        }

        let result = LatencyResult::from_samples(packets_sent, samples);
        self.logger.info("Latency test finished")
            .latency(&result)
            .log()
            .await;

        Ok(result)
    }

    /// Wait for the reply to the request stamped `client_timestamp`.
    ///
    /// Replies to earlier requests arriving late are skipped without
    /// extending the deadline.
    async fn await_reply(&self, socket: &UdpSocket, client_timestamp: f64, buf: &mut [u8]) -> RecvOutcome {
        let deadline = Instant::now() + self.receive_timeout;

        loop {
            let received = match tokio::time::timeout_at(deadline, socket.recv_from(buf)).await {
                Err(_) => return RecvOutcome::Timeout,
                Ok(Err(e)) => return RecvOutcome::Failed(e.to_string()),
                Ok(Ok((len, _))) => len,
            };
            let received_at = wire::now_seconds();

            let Some(reply) = wire::decode_response(&buf[..received]) else {
                return RecvOutcome::Failed(format!("{} byte reply is shorter than {}", received, wire::RESPONSE_LEN));
            };

            if reply.client_timestamp.to_bits() == client_timestamp.to_bits() {
                return RecvOutcome::Reply(wire::rtt_ms(client_timestamp, received_at));
            }

            self.logger.debug("Ignoring stale probe reply")
                .field("echoed", reply.client_timestamp)
                .log()
                .await;
        }
    }
}
