//! TCP transport to the device.

pub mod connection;

pub use connection::{ConnectionInfo, DEFAULT_PORT, DEFAULT_TIMEOUT, TcpTransport, Transport, probe};
