use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ip_network::IpNetwork;

fn max_mask_for_ip(ip: &IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// Address family of a [`Cidr`]. IPv4-mapped IPv6 addresses count as IPv4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    V4,
    V6,
}

/// An allowed IP range of a peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cidr(IpNetwork);

impl Cidr {
    /// # Panics
    /// Panics if the mask is invalid for the given IP address.
    pub fn new(ip: IpAddr, mask: u8) -> Self {
        Self(IpNetwork::new_truncate(ip, mask).expect("mask must fit the address family"))
    }

    #[inline]
    pub fn address(&self) -> IpAddr {
        self.0.network_address()
    }

    #[inline]
    pub fn prefix_len(&self) -> u8 {
        self.0.netmask()
    }

    pub fn family(&self) -> Family {
        match self.address() {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(ip) if ip.to_ipv4_mapped().is_some() => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// Width of the address in bits, 32 or 128.
    #[inline]
    fn bits(&self) -> u8 {
        max_mask_for_ip(&self.address())
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address(), self.prefix_len())
    }
}

impl From<IpAddr> for Cidr {
    fn from(value: IpAddr) -> Self {
        let mask = max_mask_for_ip(&value);
        Self::new(value, mask)
    }
}

impl Ord for Cidr {
    fn cmp(&self, other: &Self) -> Ordering {
        // address width, then prefix length, then address bytes
        self.bits()
            .cmp(&other.bits())
            .then_with(|| self.prefix_len().cmp(&other.prefix_len()))
            .then_with(|| self.address().cmp(&other.address()))
    }
}

impl PartialOrd for Cidr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Cidr {
    type Err = ParseCidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((ip, mask)) = s.split_once('/') {
            let ip = IpAddr::from_str(ip).map_err(|_| ParseCidrError::InvalidIp)?;
            let mask = u8::from_str(mask).map_err(|_| ParseCidrError::InvalidMask)?;
            if mask > max_mask_for_ip(&ip) {
                return Err(ParseCidrError::InvalidMask);
            }

            Ok(Self::new(ip, mask))
        } else {
            let ip = IpAddr::from_str(s).map_err(|_| ParseCidrError::InvalidIp)?;
            Ok(Self::from(ip))
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ParseCidrError {
    #[error("invalid ip address")]
    InvalidIp,
    #[error("invalid mask")]
    InvalidMask,
}

/// Renders allowed IPs as a comma separated list in a stable order,
/// independent of the input order.
pub fn allowed_ips_string(ips: &[Cidr]) -> String {
    let mut sorted = ips.to_vec();
    sorted.sort();
    sorted
        .iter()
        .map(|ip| ip.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
