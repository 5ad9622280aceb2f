use std::fs::File;
use std::io::BufReader;
use std::net::{Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;
use tracing::info;

use crate::names::{self, PeerNames};
use crate::uapi::SOCKET_DIR;

/// Prometheus exporter for WireGuard devices.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address for the WireGuard exporter; a bare ":<port>" listens on all
    /// addresses.
    #[arg(long = "metrics.addr", default_value = ":9586", value_parser = parse_addr)]
    pub metrics_addr: SocketAddr,

    /// URL path for surfacing collected metrics.
    #[arg(long = "metrics.path", default_value = "/metrics", value_parser = parse_path)]
    pub metrics_path: String,

    /// Directory of the WireGuard userspace API sockets.
    #[arg(long = "wireguard.socket-dir", default_value = SOCKET_DIR)]
    pub socket_dir: PathBuf,

    /// Comma-separated list of colon-separated public keys and friendly peer
    /// names, such as: "keyA:foo,keyB:bar".
    #[arg(long = "wireguard.peer-names")]
    pub peer_names: Option<String>,

    /// Path to a file of "<public key> <name>" lines; overrides
    /// --wireguard.peer-names.
    #[arg(long = "wireguard.peer-names-file")]
    pub peer_names_file: Option<PathBuf>,

    /// Path to a dsnet config file for peer name mapping; overrides
    /// --wireguard.peer-names-file.
    #[arg(long = "dsnet.config-file")]
    pub dsnet_config_file: Option<PathBuf>,

    /// Path to a TOML peer names mapping file; takes priority over all other
    /// peer name sources.
    #[arg(long = "wireguard.peer-file")]
    pub peer_file: Option<PathBuf>,
}

fn parse_addr(s: &str) -> Result<SocketAddr, String> {
    match s.strip_prefix(':') {
        Some(port) => port
            .parse::<u16>()
            .map(|port| SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)))
            .map_err(|e| format!("invalid port {:?}: {}", port, e)),
        None => s
            .parse()
            .map_err(|e| format!("invalid address {:?}: {}", s, e)),
    }
}

fn parse_path(s: &str) -> Result<String, String> {
    if s.starts_with('/') {
        Ok(s.to_owned())
    } else {
        Err(format!("path must start with '/': {:?}", s))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse peer names from command line: {0}")]
    PeerNames(#[source] names::Error),

    #[error("failed to read {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse peer names from {path:?}: {source}")]
    ParseError { path: PathBuf, source: names::Error },
}

impl Config {
    /// Loads the peer names of every configured source.
    ///
    /// Sources are applied from lowest to highest priority: inline names,
    /// names file, dsnet config, TOML peer file.
    pub fn peer_names(&self) -> Result<PeerNames, ConfigError> {
        let mut peer_names = PeerNames::new();

        if let Some(s) = self.peer_names.as_deref().filter(|s| !s.is_empty()) {
            let names = names::parse_inline(s).map_err(ConfigError::PeerNames)?;
            info!("loaded {} peer name mappings from command line", names.len());
            peer_names.merge(names);
        }

        let files: [(Option<&PathBuf>, ParseFn); 3] = [
            (self.peer_names_file.as_ref(), names::parse_names_file),
            (self.dsnet_config_file.as_ref(), names::parse_dsnet),
            (self.peer_file.as_ref(), names::parse_toml),
        ];
        for (path, parse) in files {
            let Some(path) = path else { continue };
            let names = load_file(path, parse)?;
            info!("loaded {} peer name mappings from file {:?}", names.len(), path);
            peer_names.merge(names);
        }

        Ok(peer_names)
    }
}

type ParseFn = fn(BufReader<File>) -> Result<PeerNames, names::Error>;

fn load_file(path: &Path, parse: ParseFn) -> Result<PeerNames, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    parse(BufReader::new(file)).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}
