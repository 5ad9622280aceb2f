mod cidr;
mod key;

use std::time::SystemTime;

pub use cidr::{allowed_ips_string, Cidr, Family, ParseCidrError};
pub use key::{Key, ParseKeyError, ENCODED_KEY_LEN, KEY_LEN};

/// A snapshot of one WireGuard interface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Device {
    pub name: String,
    pub public_key: Key,
    /// Peers in the order reported by the device.
    pub peers: Vec<Peer>,
}

/// A snapshot of one peer of a [`Device`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Peer {
    pub public_key: Key,
    /// As reported by the device, e.g. `[fe80::1%eth0]:51820`.
    pub endpoint: Option<String>,
    /// `None` if no handshake has completed yet.
    pub last_handshake_time: Option<SystemTime>,
    pub receive_bytes: u64,
    pub transmit_bytes: u64,
    pub allowed_ips: Vec<Cidr>,
}

impl Device {
    #[inline(always)]
    pub fn new(name: impl Into<String>, public_key: Key) -> Self {
        Self {
            name: name.into(),
            public_key,
            peers: vec![],
        }
    }

    #[inline(always)]
    pub fn peer(mut self, peer: Peer) -> Self {
        self.peers.push(peer);
        self
    }
}

impl Peer {
    #[inline(always)]
    pub fn new(public_key: Key) -> Self {
        Self {
            public_key,
            ..Default::default()
        }
    }

    #[inline(always)]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[inline(always)]
    pub fn last_handshake_time(mut self, t: SystemTime) -> Self {
        self.last_handshake_time = Some(t);
        self
    }

    #[inline(always)]
    pub fn receive_bytes(mut self, n: u64) -> Self {
        self.receive_bytes = n;
        self
    }

    #[inline(always)]
    pub fn transmit_bytes(mut self, n: u64) -> Self {
        self.transmit_bytes = n;
        self
    }

    #[inline(always)]
    pub fn allowed_ip<I: Into<Cidr>>(mut self, ip: I) -> Self {
        self.allowed_ips.push(ip.into());
        self
    }

    /// Seconds since the UNIX epoch of the last handshake, or 0 if there was none.
    pub fn last_handshake_secs(&self) -> u64 {
        self.last_handshake_time
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
