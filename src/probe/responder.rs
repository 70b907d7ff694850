//! Echo responder for the RTT probe

use super::wire;
use crate::logging::Logger;
use crate::types::{AppError, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How long `stop` waits for the serve loop before aborting it
const STOP_GRACE: Duration = Duration::from_secs(2);

/// Counters reported when a responder stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponderStats {
    /// Requests answered
    pub echoed: u64,
    /// Datagrams too short to carry a timestamp
    pub dropped: u64,
}

struct RunningResponder {
    local_addr: SocketAddr,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<ResponderStats>,
}

/// UDP responder that stamps and echoes probe requests on its own task
pub struct RttResponder {
    bind_addr: SocketAddr,
    poll_interval: Duration,
    logger: Logger,
    running: Option<RunningResponder>,
}

impl RttResponder {
    pub fn new(bind_addr: SocketAddr, poll_interval: Duration, logger: Logger) -> Self {
        Self {
            bind_addr,
            poll_interval,
            logger,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Bound address while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    /// Bind the socket and spawn the serve loop.
    ///
    /// Calling this while already running logs a warning and returns the
    /// existing address. A bind failure is returned as a transport error.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if let Some(running) = &self.running {
            self.logger.warn("Latency responder already started")
                .field("address", running.local_addr.to_string())
                .log()
                .await;
            return Ok(running.local_addr);
        }

        let socket = UdpSocket::bind(self.bind_addr).await.map_err(|e| {
            AppError::transport(format!("Failed to bind latency responder on {}: {}", self.bind_addr, e))
        })?;
        let local_addr = socket.local_addr()?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(serve(socket, stop_rx, self.poll_interval, self.logger.clone()));

        self.logger.info(&format!("Latency responder listening on {}", local_addr))
            .log()
            .await;

        self.running = Some(RunningResponder { local_addr, stop_tx, task });
        Ok(local_addr)
    }

    /// Start unless already running, without the duplicate-start warning
    pub async fn start_if_stopped(&mut self) -> Result<SocketAddr> {
        match self.local_addr() {
            Some(addr) => Ok(addr),
            None => self.start().await,
        }
    }

    /// Signal the serve loop and wait for it; `None` when it was not running
    pub async fn stop(&mut self) -> Option<ResponderStats> {
        let RunningResponder { local_addr, stop_tx, mut task } = self.running.take()?;
        let _ = stop_tx.send(true);

        let stats = match tokio::time::timeout(STOP_GRACE, &mut task).await {
            Ok(Ok(stats)) => stats,
            Ok(Err(e)) => {
                crate::log_error!(self.logger, "Latency responder task failed: {}", e);
                ResponderStats::default()
            }
            Err(_) => {
                task.abort();
                crate::log_warn!(self.logger, "Latency responder did not stop in time; aborted");
                ResponderStats::default()
            }
        };

        self.logger.info("Latency responder stopped")
            .field("address", local_addr.to_string())
            .field("echoed", stats.echoed)
            .field("dropped", stats.dropped)
            .log()
            .await;

        Some(stats)
    }
}

impl Drop for RttResponder {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.stop_tx.send(true);
            running.task.abort();
        }
    }
}

/// Serve loop; owns the socket so returning closes it
async fn serve(
    socket: UdpSocket,
    mut stop_rx: watch::Receiver<bool>,
    poll_interval: Duration,
    logger: Logger,
) -> ResponderStats {
    let mut stats = ResponderStats::default();
    let mut buf = vec![0u8; wire::MAX_DATAGRAM];

    loop {
        if *stop_rx.borrow() {
            break;
        }

        tokio::select! {
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            received = tokio::time::timeout(poll_interval, socket.recv_from(&mut buf)) => {
                match received {
                    // Poll tick; re-check the stop signal
                    Err(_) => continue,
                    Ok(Ok((len, peer))) => match wire::decode_request(&buf[..len]) {
                        Some(client_timestamp) => {
                            let response = wire::encode_response(client_timestamp, wire::now_seconds());
                            match socket.send_to(&response, peer).await {
                                Ok(_) => stats.echoed += 1,
                                Err(e) => {
                                    logger.debug(&format!("Failed to echo probe to {}: {}", peer, e)).log().await;
                                }
                            }
                        }
                        None => {
                            stats.dropped += 1;
                            logger.trace("Dropped undersized probe datagram")
                                .field("peer", peer.to_string())
                                .field("length", len)
                                .log()
                                .await;
                        }
                    },
                    Ok(Err(e)) => {
                        crate::log_debug!(logger, "Latency responder receive error: {}", e);
                    }
                }
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemorySink};
    use std::sync::Arc;

    fn responder() -> (RttResponder, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::with_sink("RESPONDER", sink.clone());
        let bind: SocketAddr = "127.0.0.1:0".parse().unwrap();
        (RttResponder::new(bind, Duration::from_millis(50), logger), sink)
    }

    #[tokio::test]
    async fn test_echoes_client_timestamp() {
        let (mut responder, _) = responder();
        let addr = responder.start().await.unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&wire::encode_request(123.5, 64), addr).await.unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), client.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(len, wire::RESPONSE_LEN);
        let reply = wire::decode_response(&buf[..len]).unwrap();
        assert_eq!(reply.client_timestamp, 123.5);
        assert!(reply.server_timestamp > 0.0);

        let stats = responder.stop().await.unwrap();
        assert_eq!(stats.echoed, 1);
    }

    #[tokio::test]
    async fn test_drops_undersized_requests() {
        let (mut responder, _) = responder();
        let addr = responder.start().await.unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(&[1, 2, 3], addr).await.unwrap();

        let mut buf = [0u8; 64];
        let reply = tokio::time::timeout(Duration::from_millis(300), client.recv_from(&mut buf)).await;
        assert!(reply.is_err(), "undersized request must not be answered");

        let stats = responder.stop().await.unwrap();
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.echoed, 0);
    }

    #[tokio::test]
    async fn test_second_start_warns_and_keeps_address() {
        let (mut responder, sink) = responder();
        let first = responder.start().await.unwrap();
        let second = responder.start().await.unwrap();

        assert_eq!(first, second);
        assert!(sink.contains(LogLevel::Warn, "already started"));
        responder.stop().await;
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_releases_port() {
        let (mut responder, _) = responder();
        let addr = responder.start().await.unwrap();

        assert!(responder.stop().await.is_some());
        assert!(responder.stop().await.is_none());
        assert!(!responder.is_running());

        // The socket is closed once the loop ends
        UdpSocket::bind(addr).await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_conflict_is_transport_error() {
        let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sink = Arc::new(MemorySink::new());
        let mut responder = RttResponder::new(
            taken.local_addr().unwrap(),
            Duration::from_millis(50),
            Logger::with_sink("RESPONDER", sink),
        );

        let err = responder.start().await.unwrap_err();
        assert_eq!(err.category(), "TRANSPORT");
        assert!(!responder.is_running());
    }
}
