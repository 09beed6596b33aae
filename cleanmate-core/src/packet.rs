use std::fmt::Debug;

use bytes::Bytes;
use serde_json::Value;

use crate::coerce::coerce_text;
use crate::error::{CleanmateError, Result};
use crate::header::{HEADER_LENGTH, HeaderBytes, PacketHeader};

/// Largest frame the codec will buffer (map responses are the biggest).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;
pub const MAX_BODY_SIZE: usize = MAX_FRAME_SIZE - HEADER_LENGTH;

/// One framed message: header plus JSON text body.
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    header: PacketHeader,
    body: Bytes,
}

impl Packet {
    pub fn new(body: impl Into<Bytes>) -> Result<Self> {
        let body = body.into();
        if body.len() > MAX_BODY_SIZE {
            return Err(CleanmateError::FrameTooLarge {
                size: body.len() + HEADER_LENGTH,
                max: MAX_FRAME_SIZE,
            });
        }
        Ok(Self {
            header: PacketHeader::for_body(body.len())?,
            body,
        })
    }

    /// Build a packet from an already-parsed header and its body.
    pub fn from_parts(header: PacketHeader, body: Bytes) -> Result<Self> {
        if header.body_length() != body.len() {
            return Err(CleanmateError::InvalidPacketLength {
                expected: header.total_size(),
                actual: body.len() + HEADER_LENGTH,
            });
        }
        Ok(Self { header, body })
    }

    pub fn header(&self) -> &PacketHeader {
        &self.header
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn total_size(&self) -> usize {
        self.header.total_size()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(self.total_size());
        packet.extend_from_slice(&self.header.to_bytes());
        packet.extend_from_slice(&self.body);
        packet
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LENGTH {
            return Err(CleanmateError::InvalidPacketLength {
                expected: HEADER_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut header_bytes: HeaderBytes = [0; HEADER_LENGTH];
        header_bytes.copy_from_slice(&bytes[..HEADER_LENGTH]);
        let header = PacketHeader::from_bytes(header_bytes)?;
        Self::from_parts(header, Bytes::copy_from_slice(&bytes[HEADER_LENGTH..]))
    }

    /// The body as text. The device only sends ASCII.
    pub fn text(&self) -> Result<String> {
        Ok(String::from_utf8(self.body.to_vec())?)
    }

    /// The body decoded and normalised into plain JSON values.
    pub fn decode(&self) -> Result<Value> {
        Ok(coerce_text(&self.text()?))
    }
}

impl Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("header", &self.header)
            .field("body", &String::from_utf8_lossy(&self.body))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::PREAMBLE;
    use serde_json::json;

    #[test]
    fn packet_bytes_layout() {
        let packet = Packet::new(&b"{}"[..]).unwrap();
        let bytes = packet.to_bytes();
        assert_eq!(bytes.len(), 22);
        assert_eq!(&bytes[..4], &22u32.to_le_bytes());
        assert_eq!(&bytes[4..20], &PREAMBLE);
        assert_eq!(&bytes[20..], b"{}");
    }

    #[test]
    fn from_bytes_roundtrip() {
        let packet = Packet::new(&b"{\"a\":\"1\"}"[..]).unwrap();
        let parsed = Packet::from_bytes(&packet.to_bytes()).unwrap();
        assert_eq!(parsed, packet);
        assert_eq!(parsed.decode().unwrap(), json!({"a": 1}));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut bytes = Packet::new(&b"abc"[..]).unwrap().to_bytes();
        bytes.push(b'd');
        assert!(matches!(
            Packet::from_bytes(&bytes),
            Err(CleanmateError::InvalidPacketLength { expected: 23, actual: 24 })
        ));
        assert!(matches!(
            Packet::from_bytes(&bytes[..10]),
            Err(CleanmateError::InvalidPacketLength { .. })
        ));
    }

    #[test]
    fn non_utf8_body_fails_to_decode() {
        let packet = Packet::new(vec![0xff, 0xfe]).unwrap();
        assert!(matches!(packet.decode(), Err(CleanmateError::InvalidUtf8(_))));
    }

    #[test]
    fn delimited_body_decodes_to_sequence() {
        let packet = Packet::new(&b"1;2;3"[..]).unwrap();
        assert_eq!(packet.decode().unwrap(), json!([1, 2, 3]));
    }
}
