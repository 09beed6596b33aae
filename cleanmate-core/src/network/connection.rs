use std::fmt;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, trace};

use crate::codec::CleanmateCodec;
use crate::error::{CleanmateError, Result};
use crate::header::HEADER_LENGTH;
use crate::packet::Packet;

/// TCP port the vacuum listens on.
pub const DEFAULT_PORT: u16 = 8888;

/// Deadline for one whole exchange: connect, write and read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a device lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    host: IpAddr,
    port: u16,
    timeout: Duration,
}

impl ConnectionInfo {
    pub fn new(host: IpAddr) -> Self {
        Self {
            host,
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Parse a host given as text. Only IP addresses are accepted.
    pub fn parse(host: &str) -> Result<Self> {
        let ip = host
            .trim()
            .parse()
            .map_err(|_| CleanmateError::InvalidHost(host.to_owned()))?;
        Ok(Self::new(ip))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

// ── Transport ─────────────────────────────────────────────────────

/// Moves framed packets to and from one device.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver a command the device does not answer.
    async fn send(&self, packet: Packet) -> Result<()>;

    /// Deliver a query and read back exactly one response frame.
    async fn exchange(&self, packet: Packet) -> Result<Packet>;
}

/// Opens a fresh TCP connection for every call and closes it when the
/// call returns, whether it succeeded, failed or timed out.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    info: ConnectionInfo,
}

impl TcpTransport {
    pub fn new(info: ConnectionInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    async fn open(&self) -> Result<Framed<TcpStream, CleanmateCodec>> {
        debug!(peer = %self.info, "connecting");
        let stream = TcpStream::connect(self.info.socket_addr()).await?;
        stream.set_nodelay(true)?;
        Ok(Framed::new(stream, CleanmateCodec::default()))
    }

    /// Run `fut` under the per-request deadline. On expiry the future is
    /// dropped, and with it the socket.
    async fn with_deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let timeout = self.info.timeout;
        tokio::time::timeout(timeout, fut)
            .await
            .map_err(|_| CleanmateError::Timeout(timeout))?
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, packet: Packet) -> Result<()> {
        self.with_deadline(async {
            let mut framed = self.open().await?;
            debug!(peer = %self.info, bytes = packet.total_size(), "sending command");
            trace!(body = %String::from_utf8_lossy(packet.body()));
            framed.send(packet).await?;
            if let Err(err) = framed.get_mut().shutdown().await {
                debug!(peer = %self.info, %err, "shutdown after command failed");
            }
            Ok(())
        })
        .await
    }

    async fn exchange(&self, packet: Packet) -> Result<Packet> {
        self.with_deadline(async {
            let mut framed = self.open().await?;
            debug!(peer = %self.info, bytes = packet.total_size(), "sending query");
            trace!(body = %String::from_utf8_lossy(packet.body()));
            framed.send(packet).await?;

            let response = match framed.next().await {
                Some(result) => result?,
                None => {
                    return Err(CleanmateError::ConnectionClosed {
                        received: 0,
                        expected: HEADER_LENGTH,
                    });
                }
            };
            debug!(peer = %self.info, bytes = response.total_size(), "received response");
            trace!(body = %String::from_utf8_lossy(response.body()));
            Ok(response)
        })
        .await
    }
}

/// Check that something accepts TCP connections at `info` within its
/// timeout. Nothing is sent.
pub async fn probe(info: &ConnectionInfo) -> bool {
    match tokio::time::timeout(info.timeout(), TcpStream::connect(info.socket_addr())).await {
        Ok(Ok(_)) => true,
        Ok(Err(err)) => {
            debug!(peer = %info, %err, "probe failed");
            false
        }
        Err(_) => {
            debug!(peer = %info, "probe timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_ip_addresses_only() {
        let info = ConnectionInfo::parse("192.168.1.20").unwrap();
        assert_eq!(info.port(), DEFAULT_PORT);
        assert_eq!(info.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(info.to_string(), "192.168.1.20:8888");

        assert!(ConnectionInfo::parse("::1").is_ok());
        assert!(matches!(
            ConnectionInfo::parse("vacuum.local"),
            Err(CleanmateError::InvalidHost(_))
        ));
        assert!(ConnectionInfo::parse("").is_err());
    }

    #[test]
    fn builder_overrides() {
        let info = ConnectionInfo::parse("10.0.0.2")
            .unwrap()
            .with_port(9000)
            .with_timeout(Duration::from_millis(250));
        assert_eq!(info.socket_addr().port(), 9000);
        assert_eq!(info.timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn probe_reports_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let info = ConnectionInfo::parse("127.0.0.1").unwrap().with_port(port);
        assert!(probe(&info).await);

        drop(listener);
        assert!(!probe(&info).await);
    }
}
