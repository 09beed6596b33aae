//! Command payloads and the authenticated envelope around them.
//!
//! Every request body is one compact JSON document:
//!
//! ```text
//! {"version":"1.0","control":{"authCode":"<10 chars>"},"value":{...}}
//! ```
//!
//! `value` is a [`CommandPayload`]; all of its leaf values are strings,
//! including numeric codes. The resulting text becomes the body of a
//! [`Packet`].
//!
//! [`Packet`]: crate::packet::Packet

pub mod command;
pub mod envelope;

pub use command::{CleanBlock, CommandPayload, RoomCleaning, clean_blocks, device_volume, volume_percent};
pub use envelope::{AUTH_CODE_LENGTH, AuthCode, Envelope, PROTOCOL_VERSION};
