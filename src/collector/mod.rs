//! Turns WireGuard device snapshots into metric samples.

mod desc;

use async_trait::async_trait;
use tracing::warn;

pub use desc::{
    MetricDesc, MetricKind, DEVICE_INFO, LABEL_ALLOWED_IPS, LABEL_DEVICE, LABEL_ENDPOINT,
    LABEL_NAME, LABEL_PUBLIC_KEY, PEER_INFO, PEER_LAST_HANDSHAKE, PEER_RECEIVE_BYTES,
    PEER_TRANSMIT_BYTES,
};

use crate::device::{allowed_ips_string, Device};
use crate::names::PeerNames;

/// Source of device snapshots.
///
/// Called once per scrape; may return an empty list.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    async fn devices(&self) -> anyhow::Result<Vec<Device>>;
}

#[async_trait]
impl<F> DeviceSource for F
where
    F: Fn() -> anyhow::Result<Vec<Device>> + Send + Sync,
{
    async fn devices(&self) -> anyhow::Result<Vec<Device>> {
        self()
    }
}

/// The value of a [`Sample`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(u64),
    /// The metric could not be collected.
    Invalid(String),
}

/// One sample of a metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub desc: &'static MetricDesc,
    /// Label values, in the order of `desc.labels`. Empty for invalid samples.
    pub labels: Vec<String>,
    pub value: Value,
}

impl Sample {
    fn new(desc: &'static MetricDesc, labels: Vec<String>, value: u64) -> Self {
        debug_assert_eq!(desc.labels.len(), labels.len());
        Self {
            desc,
            labels,
            value: Value::Number(value),
        }
    }

    fn invalid(desc: &'static MetricDesc, error: String) -> Self {
        Self {
            desc,
            labels: vec![],
            value: Value::Invalid(error),
        }
    }

    /// Returns the value of the label `name`.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.desc
            .labels
            .iter()
            .position(|l| *l == name)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    /// Returns the label names and values as pairs.
    pub fn label_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.desc
            .labels
            .iter()
            .copied()
            .zip(self.labels.iter().map(String::as_str))
    }
}

/// Collects WireGuard metrics from a [`DeviceSource`].
///
/// Every [`collect`](Collector::collect) fetches a fresh snapshot; nothing is kept
/// between scrapes.
#[derive(Debug)]
pub struct Collector<S> {
    source: S,
    names: PeerNames,
}

impl<S> Collector<S>
where
    S: DeviceSource,
{
    pub fn new(source: S, names: Option<PeerNames>) -> Self {
        Self {
            source,
            names: names.unwrap_or_default(),
        }
    }

    /// Returns every metric this collector can emit.
    pub fn describe(&self) -> &'static [&'static MetricDesc] {
        &desc::DESCS
    }

    pub async fn collect(&self) -> Vec<Sample> {
        let devices = match self.source.devices().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!("failed to fetch WireGuard devices: {:#}", e);
                return vec![Sample::invalid(&DEVICE_INFO, format!("{:#}", e))];
            }
        };

        let mut samples = vec![];
        for device in &devices {
            self.collect_device(device, &mut samples);
        }
        samples
    }

    fn collect_device(&self, device: &Device, samples: &mut Vec<Sample>) {
        samples.push(Sample::new(
            &DEVICE_INFO,
            vec![device.name.clone(), device.public_key.to_string()],
            1,
        ));

        for peer in &device.peers {
            let public_key = peer.public_key.to_string();
            let labels = vec![device.name.clone(), public_key.clone()];

            let endpoint = peer.endpoint.clone().unwrap_or_default();
            let name = self.names.get(&public_key).unwrap_or_default().to_owned();

            samples.push(Sample::new(
                &PEER_INFO,
                vec![
                    device.name.clone(),
                    public_key,
                    allowed_ips_string(&peer.allowed_ips),
                    endpoint,
                    name,
                ],
                1,
            ));
            samples.push(Sample::new(
                &PEER_RECEIVE_BYTES,
                labels.clone(),
                peer.receive_bytes,
            ));
            samples.push(Sample::new(
                &PEER_TRANSMIT_BYTES,
                labels.clone(),
                peer.transmit_bytes,
            ));
            samples.push(Sample::new(
                &PEER_LAST_HANDSHAKE,
                labels,
                peer.last_handshake_secs(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::device::{Cidr, Key, Peer, KEY_LEN};

    fn key(b: u8) -> Key {
        Key::new([b; KEY_LEN])
    }

    fn devices() -> Vec<Device> {
        vec![
            Device::new("wg0", key(0x01)).peer(
                Peer::new(key(0x03))
                    .receive_bytes(1)
                    .transmit_bytes(2)
                    .allowed_ip("2001:db8::/32".parse::<Cidr>().unwrap())
                    .allowed_ip("192.168.1.0/24".parse::<Cidr>().unwrap()),
            ),
            Device::new("wg1", key(0x02)),
        ]
    }

    fn source(devices: Vec<Device>) -> impl DeviceSource {
        move || -> anyhow::Result<Vec<Device>> { Ok(devices.clone()) }
    }

    fn find<'a>(samples: &'a [Sample], desc: &MetricDesc, device: &str) -> Vec<&'a Sample> {
        samples
            .iter()
            .filter(|s| s.desc == desc && s.label(LABEL_DEVICE) == Some(device))
            .collect()
    }

    fn sorted(mut samples: Vec<Sample>) -> Vec<Sample> {
        samples.sort_by(|a, b| (a.desc.name, &a.labels).cmp(&(b.desc.name, &b.labels)));
        samples
    }

    #[test]
    fn test_describe() {
        let collector = Collector::new(
            || -> anyhow::Result<Vec<Device>> { panic!("describe must not fetch") },
            None,
        );
        let names: Vec<_> = collector.describe().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "wireguard_device_info",
                "wireguard_peer_info",
                "wireguard_peer_receive_bytes_total",
                "wireguard_peer_transmit_bytes_total",
                "wireguard_peer_last_handshake_seconds",
            ]
        );
        assert_eq!(
            PEER_INFO.labels,
            &["device", "public_key", "allowed_ips", "endpoint", "name"]
        );
        assert_eq!(PEER_RECEIVE_BYTES.kind, MetricKind::Counter);
        assert_eq!(PEER_LAST_HANDSHAKE.kind, MetricKind::Gauge);
    }

    #[tokio::test]
    async fn test_collect() {
        let collector = Collector::new(source(devices()), None);
        let samples = collector.collect().await;

        // two devices, one peer with four samples
        assert_eq!(samples.len(), 6);

        let info = find(&samples, &DEVICE_INFO, "wg0");
        assert_eq!(info.len(), 1);
        assert_eq!(
            info[0].label(LABEL_PUBLIC_KEY),
            Some("AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=")
        );
        assert_eq!(info[0].value, Value::Number(1));

        let peer = find(&samples, &PEER_INFO, "wg0");
        assert_eq!(peer.len(), 1);
        assert_eq!(
            peer[0].label(LABEL_PUBLIC_KEY),
            Some("AwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwM=")
        );
        assert_eq!(
            peer[0].label(LABEL_ALLOWED_IPS),
            Some("192.168.1.0/24,2001:db8::/32")
        );
        assert_eq!(peer[0].label(LABEL_ENDPOINT), Some(""));
        assert_eq!(peer[0].label(LABEL_NAME), Some(""));
        assert_eq!(peer[0].value, Value::Number(1));

        assert_eq!(
            find(&samples, &PEER_RECEIVE_BYTES, "wg0")[0].value,
            Value::Number(1)
        );
        assert_eq!(
            find(&samples, &PEER_TRANSMIT_BYTES, "wg0")[0].value,
            Value::Number(2)
        );
        assert_eq!(
            find(&samples, &PEER_LAST_HANDSHAKE, "wg0")[0].value,
            Value::Number(0)
        );
    }

    #[tokio::test]
    async fn test_collect_device_without_peers() {
        let collector = Collector::new(source(devices()), None);
        let samples = collector.collect().await;

        let wg1: Vec<_> = samples
            .iter()
            .filter(|s| s.label(LABEL_DEVICE) == Some("wg1"))
            .collect();
        assert_eq!(wg1.len(), 1);
        assert_eq!(wg1[0].desc, &DEVICE_INFO);
    }

    #[tokio::test]
    async fn test_collect_peer_details() {
        let handshake = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let collector = Collector::new(
            source(vec![Device::new("wg0", key(0x01)).peer(
                Peer::new(key(0x03))
                    .endpoint("[2001:db8::1]:51820")
                    .last_handshake_time(handshake)
                    .receive_bytes(u64::MAX),
            )]),
            Some(PeerNames::from_iter([(key(0x03).to_string(), "laptop".to_owned())])),
        );
        let samples = collector.collect().await;

        let peer = find(&samples, &PEER_INFO, "wg0");
        assert_eq!(peer[0].label(LABEL_ENDPOINT), Some("[2001:db8::1]:51820"));
        assert_eq!(peer[0].label(LABEL_NAME), Some("laptop"));
        assert_eq!(peer[0].label(LABEL_ALLOWED_IPS), Some(""));
        assert_eq!(
            find(&samples, &PEER_LAST_HANDSHAKE, "wg0")[0].value,
            Value::Number(1_700_000_000)
        );
        assert_eq!(
            find(&samples, &PEER_RECEIVE_BYTES, "wg0")[0].value,
            Value::Number(u64::MAX)
        );
    }

    #[tokio::test]
    async fn test_collect_same_peer_on_two_devices() {
        let collector = Collector::new(
            source(vec![
                Device::new("wg0", key(0x01)).peer(Peer::new(key(0x03)).receive_bytes(10)),
                Device::new("wg1", key(0x02)).peer(Peer::new(key(0x03)).receive_bytes(20)),
            ]),
            None,
        );
        let samples = collector.collect().await;

        let rx: Vec<_> = samples
            .iter()
            .filter(|s| s.desc == &PEER_RECEIVE_BYTES)
            .map(|s| (s.label(LABEL_DEVICE).unwrap(), s.value.clone()))
            .collect();
        assert_eq!(
            rx,
            vec![("wg0", Value::Number(10)), ("wg1", Value::Number(20))]
        );

        // label sets stay unique per metric
        let mut seen = std::collections::HashSet::new();
        for s in &samples {
            assert!(seen.insert((s.desc.name, s.labels.clone())));
        }
    }

    #[tokio::test]
    async fn test_collect_is_idempotent() {
        let collector = Collector::new(source(devices()), None);
        let first = sorted(collector.collect().await);
        let second = sorted(collector.collect().await);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_collect_fetch_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let collector = Collector::new(
            move || -> anyhow::Result<Vec<Device>> {
                counter.fetch_add(1, Ordering::Relaxed);
                Err(anyhow::anyhow!("permission denied"))
            },
            None,
        );

        let samples = collector.collect().await;
        assert_eq!(
            samples,
            vec![Sample {
                desc: &DEVICE_INFO,
                labels: vec![],
                value: Value::Invalid("permission denied".to_owned()),
            }]
        );

        // no retries within a scrape
        collector.collect().await;
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_collect_empty() {
        let collector = Collector::new(source(vec![]), None);
        assert!(collector.collect().await.is_empty());
    }
}
