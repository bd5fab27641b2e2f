use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{info, warn};

use crate::core::transport::Transport;
use crate::domain::config::ConnectionConfig;
use crate::domain::error::{PromptComError, PromptComResult};

/// TCP transport for targets reachable over the network, e.g. a device
/// console exported by a telnet-style bridge.
pub struct TcpTransport {
    stream: TcpStream,
    peer: String,
}

impl TcpTransport {
    /// Connect to the endpoint described by a `ConnectionConfig::Tcp`.
    ///
    /// The configured timeout bounds both the connect and every
    /// subsequent read.
    pub fn connect(config: &ConnectionConfig) -> PromptComResult<Self> {
        let ConnectionConfig::Tcp {
            host,
            port,
            timeout_ms,
        } = config
        else {
            return Err(PromptComError::Config {
                message: "Invalid connection type for TCP transport".to_string(),
            });
        };

        let timeout = Duration::from_millis(*timeout_ms);
        let peer = format!("{}:{}", host, port);
        let addr = peer
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| PromptComError::Config {
                message: format!("Could not resolve address: {}", peer),
            })?;

        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        info!(peer = %peer, "TCP connection established");

        Ok(Self { stream, peer })
    }
}

impl Transport for TcpTransport {
    fn read_byte(&mut self) -> PromptComResult<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.stream.read(&mut byte) {
            // A remote close reads as starvation; there is no reconnect
            // path in this layer.
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(ref e) if is_read_timeout(e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> PromptComResult<usize> {
        match self.stream.read(buf) {
            Ok(n) => Ok(n),
            Err(ref e) if is_read_timeout(e) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> PromptComResult<()> {
        self.stream.write_all(data)?;
        self.stream.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("tcp:{}", self.peer)
    }
}

// Read timeouts surface as WouldBlock on Unix and TimedOut on Windows.
fn is_read_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
