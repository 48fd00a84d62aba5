//! Minimal framing decoders
//!
//! Two small grammars that run on the same [`ParseDriver`](crate::codec::ParseDriver) as the
//! HTTP decoder:
//!
//! - [`LengthPrefixedDecoder`]: a decimal length line, then that many payload bytes
//! - [`DelimitedDecoder`]: frames separated by a single delimiter byte
//!
//! Neither treats leftover bytes at the end of the stream as an error; they stay in the
//! buffer.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::ensure;
use crate::protocol::ParseError;

/// Longest accepted length line, excluding CRLF
const MAX_LENGTH_DIGITS: usize = 20;

/// Decodes `<decimal length>\r\n<payload>` frames.
#[derive(Debug, Default)]
pub struct LengthPrefixedDecoder {
    /// Payload length once the length line has been read
    pending: Option<usize>,
}

impl LengthPrefixedDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for LengthPrefixedDecoder {
    type Item = Bytes;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let length = match self.pending {
            Some(length) => length,
            None => {
                let Some(index) = src.windows(2).position(|w| w == b"\r\n") else {
                    ensure!(src.len() <= MAX_LENGTH_DIGITS, ParseError::invalid_frame("length line too long"));
                    return Ok(None);
                };

                let line = &src[..index];
                ensure!(!line.is_empty() && line.iter().all(u8::is_ascii_digit), ParseError::invalid_frame("length is not a decimal number"));
                let length = std::str::from_utf8(line)
                    .ok()
                    .and_then(|digits| digits.parse::<usize>().ok())
                    .ok_or_else(|| ParseError::invalid_frame("length overflow"))?;

                src.advance(index + 2);
                self.pending = Some(length);
                length
            }
        };

        if src.len() < length {
            return Ok(None);
        }

        self.pending = None;
        Ok(Some(src.split_to(length).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decode(src)
    }
}

/// Decodes frames terminated by a single delimiter byte, which is not part of the frame.
#[derive(Debug)]
pub struct DelimitedDecoder {
    delimiter: u8,
    /// Bytes already searched for the delimiter
    scanned: usize,
}

impl DelimitedDecoder {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter, scanned: 0 }
    }
}

impl Decoder for DelimitedDecoder {
    type Item = Bytes;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let start = self.scanned.min(src.len());
        match src[start..].iter().position(|b| *b == self.delimiter) {
            Some(offset) => {
                let frame = src.split_to(start + offset).freeze();
                src.advance(1);
                self.scanned = 0;
                Ok(Some(frame))
            }
            None => {
                self.scanned = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decode(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefixed_across_pushes() {
        let mut decoder = LengthPrefixedDecoder::new();
        let mut buf = BytesMut::from(&b"1"[..]);
        assert!(decoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"2\r\nhello ");
        assert!(decoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"world!3\r\nabc");
        assert_eq!(decoder.decode(&mut buf).unwrap().unwrap(), &b"hello world!"[..]);
        assert_eq!(decoder.decode(&mut buf).unwrap().unwrap(), &b"abc"[..]);
        assert!(buf.is_empty());
    }

    #[test]
    fn length_prefixed_zero_length() {
        let mut buf = BytesMut::from(&b"0\r\n"[..]);
        let frame = LengthPrefixedDecoder::new().decode(&mut buf).unwrap().unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn length_prefixed_rejects_non_digits() {
        let mut buf = BytesMut::from(&b"x1\r\nabc"[..]);
        let result = LengthPrefixedDecoder::new().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidFrame { .. })));
    }

    #[test]
    fn length_prefixed_rejects_endless_length_line() {
        let mut buf = BytesMut::from(&b"123456789012345678901234"[..]);
        let result = LengthPrefixedDecoder::new().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidFrame { .. })));
    }

    #[test]
    fn delimited_keeps_leftover_at_eof() {
        let mut decoder = DelimitedDecoder::new(b';');
        let mut buf = BytesMut::from(&b"a;bc;d"[..]);

        assert_eq!(decoder.decode(&mut buf).unwrap().unwrap(), &b"a"[..]);
        assert_eq!(decoder.decode(&mut buf).unwrap().unwrap(), &b"bc"[..]);
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"d");
    }
}
