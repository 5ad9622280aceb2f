#![allow(unused)]

use std::fmt::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;

use wiretun_exporter::device::Key;

pub struct TestKit {}

impl TestKit {
    #[inline(always)]
    pub fn key(b: u8) -> Key {
        Key::new([b; 32])
    }

    pub fn hex(key: &Key) -> String {
        key.as_bytes().iter().fold(String::new(), |mut s, b| {
            let _ = write!(s, "{:02x}", b);
            s
        })
    }
}

/// Serves a canned `get=1` response on `<dir>/<iface>.sock`, the way a
/// userspace WireGuard implementation does.
pub struct StubDevice {
    requests: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl StubDevice {
    pub fn spawn(dir: &Path, iface: &str, response: impl Into<String>) -> Self {
        let listener = UnixListener::bind(dir.join(format!("{}.sock", iface))).unwrap();
        let response = response.into();
        let requests = Arc::new(AtomicUsize::new(0));

        let handle = tokio::spawn({
            let requests = requests.clone();
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    requests.fetch_add(1, Ordering::Relaxed);
                    let _ = Self::handle(stream, &response).await;
                }
            }
        });

        Self { requests, handle }
    }

    /// Accepts connections on `<dir>/<iface>.sock` but never answers.
    pub fn silent(dir: &Path, iface: &str) -> Self {
        let listener = UnixListener::bind(dir.join(format!("{}.sock", iface))).unwrap();
        let requests = Arc::new(AtomicUsize::new(0));

        let handle = tokio::spawn({
            let requests = requests.clone();
            async move {
                let mut conns = vec![];
                while let Ok((stream, _)) = listener.accept().await {
                    requests.fetch_add(1, Ordering::Relaxed);
                    conns.push(stream);
                }
            }
        });

        Self { requests, handle }
    }

    async fn handle(stream: UnixStream, response: &str) -> std::io::Result<()> {
        let (rh, mut wh) = stream.into_split();
        let mut reader = BufReader::new(rh);

        let mut request = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await? == 0 || line == "\n" {
                break;
            }
            request.push_str(&line);
        }

        if request == "get=1\n" {
            wh.write_all(response.as_bytes()).await?;
        } else {
            wh.write_all(b"errno=22\n\n").await?;
        }
        wh.flush().await
    }

    #[inline(always)]
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl Drop for StubDevice {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
