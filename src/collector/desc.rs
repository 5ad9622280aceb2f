/// The kind of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Describes a metric: its final name, help, kind and label names.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

pub const LABEL_DEVICE: &str = "device";
pub const LABEL_PUBLIC_KEY: &str = "public_key";
pub const LABEL_ALLOWED_IPS: &str = "allowed_ips";
pub const LABEL_ENDPOINT: &str = "endpoint";
pub const LABEL_NAME: &str = "name";

// Peer metrics carry the device as well, a peer may belong to several devices.
const LABELS: &[&str] = &[LABEL_DEVICE, LABEL_PUBLIC_KEY];

pub static DEVICE_INFO: MetricDesc = MetricDesc {
    name: "wireguard_device_info",
    help: "Metadata about a device.",
    kind: MetricKind::Gauge,
    labels: LABELS,
};

pub static PEER_INFO: MetricDesc = MetricDesc {
    name: "wireguard_peer_info",
    help: "Metadata about a peer. The public_key label on peer metrics refers to the peer's public key; not the device's public key.",
    kind: MetricKind::Gauge,
    labels: &[
        LABEL_DEVICE,
        LABEL_PUBLIC_KEY,
        LABEL_ALLOWED_IPS,
        LABEL_ENDPOINT,
        LABEL_NAME,
    ],
};

pub static PEER_RECEIVE_BYTES: MetricDesc = MetricDesc {
    name: "wireguard_peer_receive_bytes_total",
    help: "Number of bytes received from a given peer.",
    kind: MetricKind::Counter,
    labels: LABELS,
};

pub static PEER_TRANSMIT_BYTES: MetricDesc = MetricDesc {
    name: "wireguard_peer_transmit_bytes_total",
    help: "Number of bytes transmitted to a given peer.",
    kind: MetricKind::Counter,
    labels: LABELS,
};

pub static PEER_LAST_HANDSHAKE: MetricDesc = MetricDesc {
    name: "wireguard_peer_last_handshake_seconds",
    help: "UNIX timestamp for the last handshake with a given peer.",
    kind: MetricKind::Gauge,
    labels: LABELS,
};

pub(super) static DESCS: [&MetricDesc; 5] = [
    &DEVICE_INFO,
    &PEER_INFO,
    &PEER_RECEIVE_BYTES,
    &PEER_TRANSMIT_BYTES,
    &PEER_LAST_HANDSHAKE,
];
