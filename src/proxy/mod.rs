//! The capability through which every outbound connection is opened.
//!
//! Nothing in this crate touches sockets directly: the DNS exchange and the
//! final connection both go through a [`Proxy`], so routing everything over
//! SOCKS, Tor or an HTTP CONNECT tunnel is a matter of supplying the right
//! implementation. [`Direct`] is the pass-through used when no proxy is
//! configured.

use async_trait::async_trait;
use std::{io, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};

#[cfg(test)]
pub(crate) mod mock;

/// Errors returned by [`Proxy::dial`].
#[derive(Debug, thiserror::Error)]
pub enum DialError {
    /// The proxy has no way out at all (no route, no uplink). Nothing dialed
    /// through it can succeed, so callers should stop rather than try other
    /// addresses.
    #[error("service not available")]
    ServiceNotAvailable,
    /// Any other failure to open the connection
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl DialError {
    /// Classifies an I/O error from a connect attempt.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NetworkUnreachable | io::ErrorKind::NetworkDown => {
                Self::ServiceNotAvailable
            }
            _ => Self::Io(err),
        }
    }

    /// Whether this is [`DialError::ServiceNotAvailable`].
    pub fn is_service_not_available(&self) -> bool {
        matches!(self, Self::ServiceNotAvailable)
    }
}

/// Opens byte streams to `host:port` addresses.
///
/// Implementations must be safe to share between concurrent dialers. Any
/// deadline on a dial is the implementation's business; a dial that times out
/// should be reported as [`DialError::Io`].
#[async_trait]
pub trait Proxy: Send + Sync {
    /// The connection type produced.
    type Conn: AsyncRead + AsyncWrite + Unpin + Send;

    /// Opens a connection to `address` over `network` (always `"tcp"` in
    /// this crate).
    async fn dial(&self, network: &str, address: &str) -> Result<Self::Conn, DialError>;
}

#[async_trait]
impl<P: Proxy + ?Sized> Proxy for &P {
    type Conn = P::Conn;

    async fn dial(&self, network: &str, address: &str) -> Result<Self::Conn, DialError> {
        (**self).dial(network, address).await
    }
}

#[async_trait]
impl<P: Proxy + ?Sized> Proxy for Arc<P> {
    type Conn = P::Conn;

    async fn dial(&self, network: &str, address: &str) -> Result<Self::Conn, DialError> {
        (**self).dial(network, address).await
    }
}

/// Connects straight to the target with [`TcpStream`].
///
/// Host names in the address are resolved by the operating system, so this
/// is only appropriate when no proxy is in use.
#[derive(Debug, Clone, Default)]
pub struct Direct {
    timeout: Option<Duration>,
}

impl Direct {
    /// Creates a direct dialer without a connect timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connect timeout.
    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

#[async_trait]
impl Proxy for Direct {
    type Conn = TcpStream;

    async fn dial(&self, network: &str, address: &str) -> Result<TcpStream, DialError> {
        if network != "tcp" {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported network {network:?}"),
            )
            .into());
        }

        let connect = TcpStream::connect(address);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, connect).await.map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connecting to {address} timed out"),
                )
            })?,
            None => connect.await,
        };

        result.map_err(DialError::from_io)
    }
}
