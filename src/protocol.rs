// Protocols under test and their overhead model
// (c) 2024 Ross Younger

use strum::{Display, EnumIter, EnumString};

use crate::config::Configuration;

/// The transport protocols compared by the experiments.
///
/// `Display` yields the name recorded in results files (`HTTP/1.1`, `HTTP/2`, `BitTorrent`);
/// parsing additionally accepts the short forms `http1`, `http2` and `bittorrent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Protocol {
    /// HTTP/1.1, one connection per request
    #[strum(to_string = "HTTP/1.1", serialize = "http1")]
    Http1,
    /// HTTP/2 (cleartext or TLS)
    #[strum(to_string = "HTTP/2", serialize = "http2")]
    Http2,
    /// BitTorrent swarm download
    #[strum(to_string = "BitTorrent", serialize = "bittorrent")]
    BitTorrent,
}

impl Protocol {
    /// Form of the protocol name used in results file names (`HTTP1.1`, `HTTP2`, `BitTorrent`)
    #[must_use]
    pub fn tag(self) -> String {
        self.to_string().replace('/', "")
    }
}

/// Overhead ratio calculation for one protocol.
///
/// The ratio is `(header bytes + payload bytes + framing) / payload bytes`,
/// where `framing` is a fixed per-transfer allowance for protocol framing
/// that the transfer library does not report. It is configurable per protocol
/// and defaults to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverheadModel {
    framing_bytes: u64,
}

impl OverheadModel {
    /// Constructor
    #[must_use]
    pub fn new(framing_bytes: u64) -> Self {
        Self { framing_bytes }
    }

    /// Looks up the configured framing allowance for a protocol
    #[must_use]
    pub fn for_protocol(config: &Configuration, protocol: Protocol) -> Self {
        Self::new(config.framing_for(protocol))
    }

    /// Total application-layer bytes attributed to a transfer
    #[must_use]
    pub fn total_bytes(&self, payload_bytes: u64, header_bytes: u64) -> u64 {
        payload_bytes + header_bytes + self.framing_bytes
    }

    /// Computes the overhead ratio. There is no meaningful ratio for an empty payload.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self, payload_bytes: u64, header_bytes: u64) -> Option<f64> {
        if payload_bytes == 0 {
            return None;
        }
        Some(self.total_bytes(payload_bytes, header_bytes) as f64 / payload_bytes as f64)
    }
}
