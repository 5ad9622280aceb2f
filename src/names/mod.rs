//! Friendly names for peers, keyed by base64 public key.
//!
//! Names come from several sources which are merged in order, a later
//! source overriding an earlier one for the same key. Each source is
//! validated as a whole before it is merged.

mod error;
mod file;

use std::collections::HashMap;

pub use error::Error;
pub use file::{parse_dsnet, parse_names_file, parse_toml};

use crate::device::Key;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerNames {
    names: HashMap<String, String>,
}

impl PeerNames {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, public_key: &str) -> Option<&str> {
        self.names.get(public_key).map(String::as_str)
    }

    #[inline]
    pub fn insert(&mut self, public_key: impl Into<String>, name: impl Into<String>) {
        self.names.insert(public_key.into(), name.into());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Merges `other` into `self`; names in `other` win.
    pub fn merge(&mut self, other: PeerNames) {
        self.names.extend(other.names);
    }
}

impl FromIterator<(String, String)> for PeerNames {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

pub(crate) fn check_key(key: &str) -> Result<(), Error> {
    key.parse::<Key>()
        .map(|_| ())
        .map_err(|source| Error::InvalidKey {
            key: key.to_owned(),
            source,
        })
}

/// Parses a comma separated list of `<public key>:<name>` pairs,
/// e.g. `keyA:foo,keyB:bar`.
pub fn parse_inline(s: &str) -> Result<PeerNames, Error> {
    let mut names = PeerNames::new();
    for pair in s.split(',') {
        let (key, name) = match pair.split_once(':') {
            Some((key, name)) if !key.is_empty() && !name.is_empty() => (key, name),
            _ => return Err(Error::InvalidPair(pair.to_owned())),
        };
        check_key(key)?;
        names.insert(key, name);
    }
    Ok(names)
}
