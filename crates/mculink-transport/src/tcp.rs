use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::LinkStream;

/// TCP listener for device links.
pub struct TcpLink {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpLink {
    /// Bind and listen on a TCP address such as `0.0.0.0:9000`.
    ///
    /// Port `0` picks an ephemeral port; read it back with [`TcpLink::local_addr`].
    pub fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let local_addr = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

        info!(%local_addr, "listening for device links");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<LinkStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted device link");
        Ok(LinkStream::from_tcp(stream))
    }

    /// Connect to a listening host (blocking).
    pub fn connect(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<LinkStream> {
        let stream = TcpStream::connect(&addr).map_err(|e| TransportError::Connect {
            addr: addr.to_string(),
            source: e,
        })?;
        debug!(%addr, "connected to device link host");
        Ok(LinkStream::from_tcp(stream))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
