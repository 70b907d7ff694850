//! Timestamp-echo datagram format
//!
//! Request: client send time as an 8-byte native-endian `f64` (seconds since
//! the Unix epoch) padded to the configured packet size.
//! Response: the echoed client timestamp followed by the responder's receive
//! timestamp, 16 bytes total.

use chrono::Utc;

/// Encoded size of one timestamp; also the smallest valid request
pub const TIMESTAMP_LEN: usize = 8;

/// Size of a complete response
pub const RESPONSE_LEN: usize = 2 * TIMESTAMP_LEN;

/// Largest UDP payload over IPv4
pub const MAX_DATAGRAM: usize = 65_507;

const PADDING_BYTE: u8 = b'x';

/// Decoded response datagram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoReply {
    pub client_timestamp: f64,
    pub server_timestamp: f64,
}

/// Current wall-clock time in seconds since the Unix epoch
pub fn now_seconds() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9
}

/// Build a request carrying `timestamp`, padded to `packet_size` bytes
pub fn encode_request(timestamp: f64, packet_size: usize) -> Vec<u8> {
    let mut packet = Vec::with_capacity(packet_size.max(TIMESTAMP_LEN));
    packet.extend_from_slice(&timestamp.to_ne_bytes());
    packet.resize(packet_size.max(TIMESTAMP_LEN), PADDING_BYTE);
    packet
}

/// Client timestamp of a request; `None` for undersized datagrams
pub fn decode_request(datagram: &[u8]) -> Option<f64> {
    let bytes: [u8; TIMESTAMP_LEN] = datagram.get(..TIMESTAMP_LEN)?.try_into().ok()?;
    Some(f64::from_ne_bytes(bytes))
}

pub fn encode_response(client_timestamp: f64, server_timestamp: f64) -> [u8; RESPONSE_LEN] {
    let mut response = [0u8; RESPONSE_LEN];
    response[..TIMESTAMP_LEN].copy_from_slice(&client_timestamp.to_ne_bytes());
    response[TIMESTAMP_LEN..].copy_from_slice(&server_timestamp.to_ne_bytes());
    response
}

/// Decode a response; `None` when shorter than [`RESPONSE_LEN`]
pub fn decode_response(datagram: &[u8]) -> Option<EchoReply> {
    let client: [u8; TIMESTAMP_LEN] = datagram.get(..TIMESTAMP_LEN)?.try_into().ok()?;
    let server: [u8; TIMESTAMP_LEN] = datagram.get(TIMESTAMP_LEN..RESPONSE_LEN)?.try_into().ok()?;
    Some(EchoReply {
        client_timestamp: f64::from_ne_bytes(client),
        server_timestamp: f64::from_ne_bytes(server),
    })
}

/// Round trip in milliseconds from the echoed client timestamp
///
/// Only the client clock is involved, so skew between hosts does not leak in.
/// A clock stepping backwards yields 0 rather than a negative sample.
pub fn rtt_ms(client_timestamp: f64, received_at: f64) -> f64 {
    ((received_at - client_timestamp) * 1000.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_layout() {
        let packet = encode_request(1_700_000_000.25, 64);
        assert_eq!(packet.len(), 64);
        assert_eq!(decode_request(&packet), Some(1_700_000_000.25));
        assert!(packet[TIMESTAMP_LEN..].iter().all(|&b| b == b'x'));
    }

    #[test]
    fn test_request_never_shorter_than_timestamp() {
        assert_eq!(encode_request(1.0, 0).len(), TIMESTAMP_LEN);
        assert_eq!(encode_request(1.0, TIMESTAMP_LEN).len(), TIMESTAMP_LEN);
    }

    #[test]
    fn test_undersized_request_rejected() {
        assert_eq!(decode_request(&[0u8; 7]), None);
        assert_eq!(decode_request(&[]), None);
    }

    #[test]
    fn test_response_layout() {
        let response = encode_response(10.5, 11.0);
        let reply = decode_response(&response).unwrap();
        assert_eq!(reply.client_timestamp, 10.5);
        assert_eq!(reply.server_timestamp, 11.0);

        assert_eq!(decode_response(&response[..15]), None);
        assert_eq!(decode_response(&response[..8]), None);
    }

    #[test]
    fn test_rtt_uses_client_clock() {
        assert!((rtt_ms(100.0, 100.012) - 12.0).abs() < 1e-6);
        assert_eq!(rtt_ms(100.0, 99.0), 0.0);
    }

    #[test]
    fn test_now_is_after_2020() {
        assert!(now_seconds() > 1_577_836_800.0);
    }
}
