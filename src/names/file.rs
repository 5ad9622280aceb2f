use std::io::{BufRead, Read};

use serde::Deserialize;

use super::{check_key, Error, PeerNames};

/// Parses a names file: one `<public key> <name>` pair per line.
///
/// Everything after a `#` is a comment; blank lines are skipped.
pub fn parse_names_file<R: BufRead>(reader: R) -> Result<PeerNames, Error> {
    let mut names = PeerNames::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let at = |source: Error| Error::Line {
            line: i + 1,
            source: Box::new(source),
        };

        let content = line.split('#').next().unwrap_or_default();
        if content.trim().is_empty() {
            continue;
        }
        let (key, name) = content.split_once(' ').ok_or_else(|| at(Error::InvalidSyntax))?;
        check_key(key).map_err(at)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(at(Error::EmptyName(key.to_owned())));
        }
        names.insert(key, name);
    }
    Ok(names)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlFile {
    #[serde(default, rename = "peer")]
    peers: Vec<TomlPeer>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlPeer {
    #[serde(default)]
    public_key: String,
    #[serde(default)]
    name: String,
}

/// Parses a TOML peer file:
///
/// ```toml
/// [[peer]]
/// public_key = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE="
/// name = "foo"
/// ```
pub fn parse_toml<R: Read>(mut reader: R) -> Result<PeerNames, Error> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    let file: TomlFile = toml::from_str(&contents)?;

    let mut names = PeerNames::new();
    for peer in file.peers {
        check_key(&peer.public_key)?;
        if peer.name.is_empty() {
            return Err(Error::EmptyName(peer.public_key));
        }
        names.insert(peer.public_key, peer.name);
    }
    Ok(names)
}

#[derive(Debug, Deserialize)]
struct DsnetConfig {
    #[serde(default, rename = "Peers")]
    peers: Vec<DsnetPeer>,
}

#[derive(Debug, Deserialize)]
struct DsnetPeer {
    #[serde(default, rename = "Hostname")]
    hostname: String,
    #[serde(default, rename = "PublicKey")]
    public_key: String,
}

/// Parses peer hostnames from a dsnet JSON configuration. Fields other than
/// `Peers[].PublicKey` and `Peers[].Hostname` are ignored.
pub fn parse_dsnet<R: Read>(reader: R) -> Result<PeerNames, Error> {
    let cfg: DsnetConfig = serde_json::from_reader(reader)?;

    let mut names = PeerNames::new();
    for peer in cfg.peers {
        check_key(&peer.public_key)?;
        if peer.hostname.is_empty() {
            return Err(Error::EmptyName(peer.public_key));
        }
        names.insert(peer.public_key, peer.hostname);
    }
    Ok(names)
}
