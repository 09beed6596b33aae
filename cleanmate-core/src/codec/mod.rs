//! `tokio_util` codec for Cleanmate frames.
//!
//! The decoder waits for the 20-byte header, reads the total size from
//! its prefix, then waits for the rest of the frame. A stream that ends
//! part-way through a frame is reported as
//! [`CleanmateError::ConnectionClosed`] instead of a short packet.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::CleanmateError;
use crate::header::{HEADER_LENGTH, HeaderBytes, PacketHeader};
use crate::packet::{MAX_FRAME_SIZE, Packet};

#[derive(Debug, Default, Clone, Copy)]
pub struct CleanmateCodec {}

impl CleanmateCodec {
    fn peek_header(src: &BytesMut) -> Result<Option<PacketHeader>, CleanmateError> {
        if src.len() < HEADER_LENGTH {
            return Ok(None);
        }
        let mut header_bytes: HeaderBytes = [0; HEADER_LENGTH];
        header_bytes.copy_from_slice(&src[..HEADER_LENGTH]);
        let header = PacketHeader::from_bytes(header_bytes)?;
        if header.total_size() > MAX_FRAME_SIZE {
            return Err(CleanmateError::FrameTooLarge {
                size: header.total_size(),
                max: MAX_FRAME_SIZE,
            });
        }
        Ok(Some(header))
    }
}

impl Decoder for CleanmateCodec {
    type Item = Packet;
    type Error = CleanmateError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(header) = Self::peek_header(src)? else {
            src.reserve(HEADER_LENGTH - src.len());
            return Ok(None);
        };

        let total = header.total_size();
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        let mut frame = src.split_to(total).freeze();
        let body = frame.split_off(HEADER_LENGTH);
        Packet::from_parts(header, body).map(Some)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(packet) = self.decode(src)? {
            return Ok(Some(packet));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let expected = match Self::peek_header(src)? {
            Some(header) => header.total_size(),
            None => HEADER_LENGTH,
        };
        Err(CleanmateError::ConnectionClosed {
            received: src.len(),
            expected,
        })
    }
}

impl Encoder<Packet> for CleanmateCodec {
    type Error = CleanmateError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.total_size());
        dst.extend_from_slice(&item.header().to_bytes());
        dst.extend_from_slice(item.body());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;
    use tokio_util::codec::FramedRead;

    fn frame(body: &[u8]) -> Vec<u8> {
        Packet::new(body.to_vec()).unwrap().to_bytes()
    }

    #[test]
    fn decode_waits_for_full_frame() {
        let bytes = frame(b"{\"battery\":\"80\"}");
        let mut codec = CleanmateCodec::default();
        let mut buf = BytesMut::from(&bytes[..10]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&bytes[10..25]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&bytes[25..]);
        let packet = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(packet.decode().unwrap(), json!({"battery": 80}));
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_matches_packet_bytes() {
        let packet = Packet::new(&b"{}"[..]).unwrap();
        let mut dst = BytesMut::new();
        CleanmateCodec::default()
            .encode(packet.clone(), &mut dst)
            .unwrap();
        assert_eq!(&dst[..], &packet.to_bytes()[..]);
    }

    #[test]
    fn oversized_prefix_is_rejected() {
        let mut bytes = frame(b"{}");
        bytes[..4].copy_from_slice(&(MAX_FRAME_SIZE as u32 + 1).to_le_bytes());
        let mut buf = BytesMut::from(&bytes[..]);
        assert!(matches!(
            CleanmateCodec::default().decode(&mut buf),
            Err(CleanmateError::FrameTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn frames_split_across_reads() {
        let bytes = frame(b"1,2,3");
        let mock = tokio_test::io::Builder::new()
            .read(&bytes[..3])
            .read(&bytes[3..21])
            .read(&bytes[21..])
            .build();
        let mut reader = FramedRead::new(mock, CleanmateCodec::default());
        let packet = reader.next().await.unwrap().unwrap();
        assert_eq!(packet.decode().unwrap(), json!([1, 2, 3]));
        assert!(reader.next().await.is_none());
    }

    #[tokio::test]
    async fn close_mid_body_is_a_closed_connection() {
        let bytes = frame(b"{\"state\":\"1\"}");
        let mock = tokio_test::io::Builder::new().read(&bytes[..24]).build();
        let mut reader = FramedRead::new(mock, CleanmateCodec::default());
        let err = reader.next().await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            CleanmateError::ConnectionClosed { received: 24, expected } if expected == bytes.len()
        ));
    }

    #[tokio::test]
    async fn close_before_any_byte_ends_the_stream() {
        let mock = tokio_test::io::Builder::new().build();
        let mut reader = FramedRead::new(mock, CleanmateCodec::default());
        assert!(reader.next().await.is_none());
    }
}
