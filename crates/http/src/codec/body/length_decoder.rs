//! Decoder implementation for HTTP messages with Content-Length header.
//!
//! This module provides functionality to decode HTTP messages where the payload size
//! is specified by the Content-Length header, as defined in
//! [RFC 9112 Section 6.2](https://www.rfc-editor.org/rfc/rfc9112#section-6.2).

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::protocol::ParseError;

/// A decoder for handling HTTP messages with a known content length.
///
/// Nothing is consumed until the whole body is buffered; the body is then split off the
/// front of the buffer in one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// The number of bytes the body is made of
    length: usize,
}

impl LengthDecoder {
    /// Creates a new `LengthDecoder` instance.
    ///
    /// # Arguments
    /// * `length` - The total content length to decode, specified by Content-Length header
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Decoder for LengthDecoder {
    type Item = Bytes;
    type Error = ParseError;

    /// Decodes the body once `length` bytes are available.
    ///
    /// # Returns
    /// * `Ok(Some(bytes))` when the whole body has been read
    /// * `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < self.length {
            return Ok(None);
        }

        Ok(Some(src.split_to(self.length).freeze()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let mut buffer: BytesMut = BytesMut::from(&b"101234567890abcdef\r\n\r\n"[..]);

        let mut length_decoder = LengthDecoder::new(10);
        let bytes = length_decoder.decode(&mut buffer).unwrap().unwrap();

        assert_eq!(bytes.len(), 10);
        assert_eq!(&bytes[..], b"1012345678");
        assert_eq!(&buffer[..], b"90abcdef\r\n\r\n");
    }

    #[test]
    fn test_waits_for_whole_body() {
        let mut buffer: BytesMut = BytesMut::from(&b"abcd"[..]);
        let mut length_decoder = LengthDecoder::new(6);

        assert!(length_decoder.decode(&mut buffer).unwrap().is_none());
        assert_eq!(&buffer[..], b"abcd");

        buffer.extend_from_slice(b"\r\nGET");
        let bytes = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&bytes[..], b"abcd\r\n");
        assert_eq!(&buffer[..], b"GET");
    }

    #[test]
    fn test_zero_length() {
        let mut buffer = BytesMut::new();
        let bytes = LengthDecoder::new(0).decode(&mut buffer).unwrap().unwrap();
        assert!(bytes.is_empty());
    }
}
