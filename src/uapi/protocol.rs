use std::net::SocketAddr;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use crate::device::{Cidr, Device, Key, Peer, KEY_LEN};

use super::Error;

pub(super) const GET_REQUEST: &[u8] = b"get=1\n\n";

/// Decodes the body of a `get=1` response for the interface `name`.
///
/// The body is a sequence of `key=value` lines. Device fields come first,
/// every `public_key` line starts a new peer and the remaining lines belong to
/// the latest peer.
pub(super) fn decode_get(name: &str, lines: &[String]) -> Result<Device, Error> {
    let mut private_key = None;
    let mut peers: Vec<PeerBuilder> = vec![];

    for line in lines {
        let (key, value) = line.split_once('=').ok_or(Error::InvalidProtocol)?;
        match key {
            "private_key" => private_key = Some(decode_key(key, value)?),
            "listen_port" => {
                parse::<u16>(key, value)?;
            }
            "fwmark" => {
                parse::<u32>(key, value)?;
            }
            "errno" => match parse::<i64>(key, value)? {
                0 => {}
                errno => return Err(Error::Errno(errno)),
            },
            "public_key" => peers.push(PeerBuilder::new(decode_key(key, value)?)),
            _ => {
                let peer = peers.last_mut().ok_or(Error::InvalidProtocol)?;
                peer.set(key, value)?;
            }
        }
    }

    let public_key = private_key
        .map(|k| Key::public_from_private(&k))
        .unwrap_or_default();

    Ok(Device {
        name: name.to_owned(),
        public_key,
        peers: peers
            .into_iter()
            .map(PeerBuilder::build)
            .collect::<Result<_, _>>()?,
    })
}

struct PeerBuilder {
    peer: Peer,
    handshake_secs: u64,
    handshake_nanos: u32,
}

impl PeerBuilder {
    fn new(public_key: Key) -> Self {
        Self {
            peer: Peer::new(public_key),
            handshake_secs: 0,
            handshake_nanos: 0,
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        match key {
            "endpoint" => self.peer.endpoint = Some(decode_endpoint(key, value)?),
            "last_handshake_time_sec" => self.handshake_secs = parse(key, value)?,
            "last_handshake_time_nsec" => self.handshake_nanos = parse(key, value)?,
            "rx_bytes" => self.peer.receive_bytes = parse(key, value)?,
            "tx_bytes" => self.peer.transmit_bytes = parse(key, value)?,
            "allowed_ip" => self.peer.allowed_ips.push(parse::<Cidr>(key, value)?),
            "preshared_key" => {
                decode_key(key, value)?;
            }
            "persistent_keepalive_interval" => {
                parse::<u16>(key, value)?;
            }
            "protocol_version" => {
                parse::<u32>(key, value)?;
            }
            _ => return Err(Error::InvalidProtocol),
        }
        Ok(())
    }

    fn build(mut self) -> Result<Peer, Error> {
        if self.handshake_secs != 0 || self.handshake_nanos != 0 {
            let time = SystemTime::UNIX_EPOCH
                .checked_add(Duration::from_secs(self.handshake_secs))
                .and_then(|t| t.checked_add(Duration::from_nanos(self.handshake_nanos as _)))
                .ok_or_else(|| {
                    invalid_value("last_handshake_time_sec", &self.handshake_secs.to_string())
                })?;
            self.peer.last_handshake_time = Some(time);
        }
        Ok(self.peer)
    }
}

#[inline]
fn invalid_value(key: &str, value: &str) -> Error {
    Error::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}

#[inline]
fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value.parse().map_err(|_| invalid_value(key, value))
}

/// Checks an endpoint and returns it as reported. IPv6 endpoints may carry a
/// zone, e.g. `[fe80::1%eth0]:51820`, which `SocketAddr` only accepts numeric.
fn decode_endpoint(key: &str, value: &str) -> Result<String, Error> {
    let unzoned = match (value.find('%'), value.find(']')) {
        (Some(zone), Some(end)) if value.starts_with('[') && zone < end => {
            format!("{}{}", &value[..zone], &value[end..])
        }
        _ => value.to_owned(),
    };
    parse::<SocketAddr>(key, &unzoned)?;
    Ok(value.to_owned())
}

fn decode_key(key: &str, value: &str) -> Result<Key, Error> {
    decode_hex(value)
        .map(Key::new)
        .ok_or_else(|| invalid_value(key, value))
}

fn decode_hex(s: &str) -> Option<[u8; KEY_LEN]> {
    if s.len() != KEY_LEN * 2 || !s.is_ascii() {
        return None;
    }
    let mut out = [0u8; KEY_LEN];
    for (i, b) in out.iter_mut().enumerate() {
        *b = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(out)
}
