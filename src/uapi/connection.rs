use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

use super::protocol::GET_REQUEST;
use super::Error;

pub(super) struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    pub async fn connect<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let socket = UnixStream::connect(path).await?;
        let (rh, wh) = socket.into_split();
        Ok(Self {
            reader: BufReader::new(rh),
            writer: wh,
        })
    }

    /// Sends a `get=1` request and returns the `key=value` lines of the response,
    /// without the terminating blank line.
    ///
    /// ## Cancel Safety
    /// The method is not cancellation safe.
    pub async fn get(&mut self) -> Result<Vec<String>, Error> {
        self.writer.write_all(GET_REQUEST).await?;
        self.writer.flush().await?;

        let mut lines = vec![];
        loop {
            let mut buf = String::new();
            if self.reader.read_line(&mut buf).await? == 0 {
                // closed before the terminating blank line
                return Err(Error::InvalidProtocol);
            }
            let line = buf.trim_end_matches('\n');
            if line.is_empty() {
                break;
            }
            lines.push(line.to_owned());
        }
        Ok(lines)
    }
}
