//! # cleanmate-core
//!
//! Protocol library for Cleanmate robot vacuums, which speak
//! length-prefixed JSON over TCP on port 8888.
//!
//! This crate contains:
//! - **Framing**: `PacketHeader`, `Packet`, and `CleanmateCodec` for `tokio_util`
//! - **Coercion**: `coerce`, which normalises the device's stringly-typed payloads
//! - **Protocol**: `Envelope`, `AuthCode`, and one `CommandPayload` per operation
//! - **Network**: the `Transport` trait and `TcpTransport` (one connection per request)
//! - **Client**: `CleanmateClient`, typed commands plus state and map refresh
//! - **State**: `DeviceState` and `MapState` with sparse updates
//! - **Error**: `CleanmateError`, a typed `thiserror` error hierarchy

pub mod client;
pub mod codec;
pub mod coerce;
pub mod error;
pub mod header;
pub mod message;
pub mod network;
pub mod packet;
pub mod protocol;
pub mod state;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use client::CleanmateClient;
pub use codec::CleanmateCodec;
pub use coerce::coerce;
pub use error::{CleanmateError, ErrorKind, Result};
pub use header::{HEADER_LENGTH, PacketHeader, decode_size_prefix, encode_size_prefix};
pub use message::{ErrorCode, MopMode, OpCmd, TransitCmd, WorkMode, WorkState};
pub use network::{ConnectionInfo, DEFAULT_PORT, DEFAULT_TIMEOUT, TcpTransport, Transport, probe};
pub use packet::{MAX_FRAME_SIZE, Packet};
pub use protocol::{AuthCode, CommandPayload, Envelope, RoomCleaning};
pub use state::{DeviceState, MapState, Position, Room};
