//! The fixed 20-byte frame header.
//!
//! ```text
//! ┌──────────────┬───────────────────────────────────────────┐
//! │ size (4, LE) │ preamble (16)                             │
//! │ body + 20    │ fa 00 00 00 01 00 00 00 c5 27 00 00 01 .. │
//! └──────────────┴───────────────────────────────────────────┘
//! ```
//!
//! The size counts the whole packet, header included. The device
//! documentation describes it as the zero-padded hex rendering of the
//! size with its digit pairs reversed, which is the little-endian byte
//! order of a `u32`.

use crate::error::{CleanmateError, Result};

/// Total header length in bytes, size prefix included.
pub const HEADER_LENGTH: usize = 20;

/// Length of the size prefix at the start of the header.
pub const SIZE_PREFIX_LENGTH: usize = 4;

/// The constant bytes that follow the size prefix on every outbound packet.
pub const PREAMBLE: [u8; 16] = [
    0xfa, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0xc5, 0x27, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
];

pub type HeaderBytes = [u8; HEADER_LENGTH];

/// Encode a total packet size as the byte-swapped wire prefix.
pub fn encode_size_prefix(size: u32) -> [u8; SIZE_PREFIX_LENGTH] {
    size.to_le_bytes()
}

/// Inverse of [`encode_size_prefix`].
pub fn decode_size_prefix(prefix: [u8; SIZE_PREFIX_LENGTH]) -> u32 {
    u32::from_le_bytes(prefix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    total_size: u32,
    preamble: [u8; 16],
}

impl PacketHeader {
    /// Header for an outbound packet carrying `body_length` bytes.
    pub fn for_body(body_length: usize) -> Result<Self> {
        let total = body_length
            .checked_add(HEADER_LENGTH)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(CleanmateError::FrameTooLarge {
                size: body_length,
                max: u32::MAX as usize - HEADER_LENGTH,
            })?;
        Ok(Self {
            total_size: total,
            preamble: PREAMBLE,
        })
    }

    pub fn to_bytes(&self) -> HeaderBytes {
        let mut header: HeaderBytes = [0; HEADER_LENGTH];
        header[..SIZE_PREFIX_LENGTH].copy_from_slice(&encode_size_prefix(self.total_size));
        header[SIZE_PREFIX_LENGTH..].copy_from_slice(&self.preamble);
        header
    }

    /// Parse an inbound header. The preamble is kept but not checked;
    /// devices vary it between firmware versions.
    pub fn from_bytes(bytes: HeaderBytes) -> Result<Self> {
        let mut prefix = [0u8; SIZE_PREFIX_LENGTH];
        prefix.copy_from_slice(&bytes[..SIZE_PREFIX_LENGTH]);
        let total_size = decode_size_prefix(prefix);
        if (total_size as usize) < HEADER_LENGTH {
            return Err(CleanmateError::InvalidHeader(
                "size prefix smaller than the header",
            ));
        }

        let mut preamble = [0u8; 16];
        preamble.copy_from_slice(&bytes[SIZE_PREFIX_LENGTH..]);
        Ok(Self {
            total_size,
            preamble,
        })
    }

    /// Size of the whole packet, header included.
    pub fn total_size(&self) -> usize {
        self.total_size as usize
    }

    /// Size of the body that follows the header.
    pub fn body_length(&self) -> usize {
        self.total_size() - HEADER_LENGTH
    }

    pub fn preamble(&self) -> &[u8; 16] {
        &self.preamble
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The prefix as the device documentation describes it: pad the hex
    /// size to eight digits, then emit the digit pairs last to first.
    fn swapped_hex(size: u32) -> String {
        let padded = format!("{size:08x}");
        (0..4)
            .rev()
            .map(|i| &padded[i * 2..i * 2 + 2])
            .collect()
    }

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn prefix_matches_pair_reversed_hex() {
        for size in [20u32, 0x52, 0x1234, 0xdead_beef, u32::MAX] {
            assert_eq!(hex(&encode_size_prefix(size)), swapped_hex(size));
        }
        assert_eq!(hex(&encode_size_prefix(0x52)), "52000000");
    }

    #[test]
    fn prefix_roundtrip_across_range() {
        let mut n: u64 = 20;
        while n <= u32::MAX as u64 {
            let size = n as u32;
            assert_eq!(decode_size_prefix(encode_size_prefix(size)), size);
            n = n * 3 + 1;
        }
        assert_eq!(decode_size_prefix(encode_size_prefix(u32::MAX)), u32::MAX);
    }

    #[test]
    fn header_layout() {
        let header = PacketHeader::for_body(62).unwrap();
        let bytes = header.to_bytes();
        assert_eq!(hex(&bytes), "52000000fa00000001000000c527000001000000");
        assert_eq!(header.total_size(), 82);
        assert_eq!(header.body_length(), 62);
    }

    #[test]
    fn header_from_bytes() {
        let bytes = PacketHeader::for_body(5).unwrap().to_bytes();
        let parsed = PacketHeader::from_bytes(bytes).unwrap();
        assert_eq!(parsed.body_length(), 5);
        assert_eq!(parsed.preamble(), &PREAMBLE);
    }

    #[test]
    fn header_smaller_than_itself_is_rejected() {
        let mut bytes = [0u8; HEADER_LENGTH];
        bytes[0] = 19;
        assert!(matches!(
            PacketHeader::from_bytes(bytes),
            Err(CleanmateError::InvalidHeader(_))
        ));
    }
}
