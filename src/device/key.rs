use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use x25519_dalek::{PublicKey, StaticSecret};

pub const KEY_LEN: usize = 32;

/// Length of a base64 encoded key.
pub const ENCODED_KEY_LEN: usize = 44;

/// A WireGuard Curve25519 key.
///
/// Displayed as standard base64, the form used by `wg(8)` and by the
/// `public_key` label of every exported metric.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    #[inline]
    pub const fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; KEY_LEN]
    }

    /// Derives the public key belonging to a private key.
    pub fn public_from_private(private_key: &Key) -> Self {
        let secret = StaticSecret::from(private_key.0);
        Self(PublicKey::from(&secret).to_bytes())
    }
}

impl From<[u8; KEY_LEN]> for Key {
    fn from(value: [u8; KEY_LEN]) -> Self {
        Self(value)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&STANDARD.encode(self.0))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self)
    }
}

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ENCODED_KEY_LEN {
            return Err(ParseKeyError::InvalidLength(s.len()));
        }
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| ParseKeyError::InvalidBase64(e.to_string()))?;
        let bytes: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| ParseKeyError::InvalidKeyLength(b.len()))?;
        Ok(Self(bytes))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ParseKeyError {
    #[error("encoded key length {0}, should be {ENCODED_KEY_LEN}")]
    InvalidLength(usize),
    #[error("bad base64 format: {0}")]
    InvalidBase64(String),
    #[error("decoded key length {0}, should be {KEY_LEN}")]
    InvalidKeyLength(usize),
}
