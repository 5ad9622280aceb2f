//! Client for the WireGuard cross-platform userspace API.
//!
//! Userspace implementations (wireguard-go, boringtun, wiretun) serve the API on
//! a unix socket per interface, `<socket dir>/<iface>.sock`.

mod connection;
mod error;
mod protocol;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use connection::Connection;
pub use error::Error;

use crate::collector::DeviceSource;
use crate::device::Device;

pub const SOCKET_DIR: &str = "/var/run/wireguard";

/// Time limit of one exchange with a device.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const SOCKET_EXT: &str = "sock";

/// Fetches device snapshots over UAPI.
#[derive(Debug, Clone)]
pub struct Client {
    socket_dir: PathBuf,
    timeout: Duration,
}

impl Client {
    pub fn new<P: AsRef<Path>>(socket_dir: P) -> Self {
        Self {
            socket_dir: socket_dir.as_ref().to_path_buf(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[inline(always)]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn socket_path(&self, iface: &str) -> PathBuf {
        self.socket_dir.join(format!("{}.{}", iface, SOCKET_EXT))
    }

    /// Returns the names of all interfaces with a socket in the socket directory,
    /// sorted by name. A missing directory means there are no interfaces.
    pub async fn interfaces(&self) -> Result<Vec<String>, Error> {
        let mut entries = match tokio::fs::read_dir(&self.socket_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut names = vec![];
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SOCKET_EXT) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(name.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Queries a single interface. Fails with [`Error::Timeout`] if the device
    /// does not answer in time.
    pub async fn device(&self, iface: &str) -> Result<Device, Error> {
        let path = self.socket_path(iface);
        debug!("querying UAPI socket {:?}", path);
        let lines = tokio::time::timeout(self.timeout, async {
            let mut conn = Connection::connect(&path).await?;
            conn.get().await
        })
        .await
        .map_err(|_| Error::Timeout(self.timeout))??;
        protocol::decode_get(iface, &lines)
    }

    /// Queries every interface in the socket directory.
    pub async fn devices(&self) -> Result<Vec<Device>, Error> {
        let mut devices = vec![];
        for iface in self.interfaces().await? {
            devices.push(self.device(&iface).await?);
        }
        Ok(devices)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(SOCKET_DIR)
    }
}

#[async_trait]
impl DeviceSource for Client {
    async fn devices(&self) -> anyhow::Result<Vec<Device>> {
        Ok(Client::devices(self).await?)
    }
}
