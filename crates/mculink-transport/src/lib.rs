//! TCP byte-connection transport for MCU telemetry links.
//!
//! Devices reach the host over TCP, either directly or through Wi-Fi and
//! cellular data bridges that terminate as TCP. This is the lowest layer of
//! mculink: a bidirectional [`LinkStream`] and a [`TcpLink`] listener.
//! Framing reads and writes any `Read + Write` and uses this crate only for
//! its `with_config_link` constructors, which apply socket timeouts. Routing
//! does not depend on it.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::LinkStream;
pub use tcp::TcpLink;
