//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This module decodes bodies sent with `Transfer-Encoding: chunked` as specified in
//! [RFC 9112 Section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1).
//!
//! Unlike a streaming decoder, [`ChunkedDecoder`] collects the data of every chunk and
//! yields the whole body once the terminating zero-size chunk has been read, because the
//! proxy re-frames the body with a `Content-Length` before forwarding it.

use std::mem;
use std::task::Poll;

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;
use ChunkedState::*;

use crate::protocol::ParseError;

/// Collects a chunked body into one buffer.
///
/// Input is consumed a byte at a time for the framing and a slice at a time for chunk data,
/// so the decoder can stop at any byte and pick up again once more input is pushed. Chunk
/// extensions and trailer fields are read past and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    /// size of the current chunk still to read
    remaining_size: u64,
    /// hex digits seen on the current size line
    size_digits: usize,
    body: BytesMut,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: Size, remaining_size: 0, size_digits: 0, body: BytesMut::new() }
    }

    fn step(&mut self, src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match self.state {
            Size => ChunkedState::read_size(src, &mut self.remaining_size, &mut self.size_digits),
            SizeLws => ChunkedState::read_size_lws(src),
            Extension => ChunkedState::read_extension(src),
            SizeLf => ChunkedState::read_size_lf(src, self.remaining_size),
            Body => ChunkedState::read_body(src, &mut self.remaining_size, &mut self.body),
            BodyCr => ChunkedState::read_body_cr(src),
            BodyLf => ChunkedState::read_body_lf(src, &mut self.size_digits),
            Trailer => ChunkedState::read_trailer(src),
            TrailerLf => ChunkedState::read_trailer_lf(src),
            EndCr => ChunkedState::read_end_cr(src),
            EndLf => ChunkedState::read_end_lf(src),
            End => Poll::Ready(Ok(End)),
        }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// hex digits of a size line
    Size,
    /// blanks between the size and the line end
    SizeLws,
    /// `;name=value` after the size, ignored
    Extension,
    SizeLf,
    /// data bytes of a non-empty chunk
    Body,
    BodyCr,
    BodyLf,
    /// one trailer line after the zero chunk, ignored
    Trailer,
    TrailerLf,
    /// start of the line after the zero chunk: either a trailer or the final CRLF
    EndCr,
    EndLf,
    /// the whole body has been read
    End,
}

impl Decoder for ChunkedDecoder {
    type Item = Bytes;
    type Error = ParseError;

    /// Reads as far as `src` allows. The body is returned, and the decoder reset, only once
    /// the zero chunk and the CRLF closing the trailer section have been consumed.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == End {
                trace!(len = self.body.len(), "finished reading chunked body");
                self.state = Size;
                self.size_digits = 0;
                return Ok(Some(mem::take(&mut self.body).freeze()));
            }

            if src.is_empty() {
                return Ok(None);
            }

            self.state = match self.step(src) {
                Poll::Pending => return Ok(None),
                Poll::Ready(Ok(new_state)) => new_state,
                Poll::Ready(Err(e)) => return Err(e),
            };
        }
    }
}

macro_rules! try_next_byte {
    ($src:ident) => {{
        if $src.len() > 0 {
            $src.get_u8()
        } else {
            return Poll::Pending;
        }
    }};
}

impl ChunkedState {
    /// Accumulates one hex digit of the size line into `size_per_chunk`.
    ///
    /// A blank, `;` or CR ends the digits, but only once at least one digit was read. The
    /// size is checked for overflow as it grows.
    fn read_size(src: &mut BytesMut, size_per_chunk: &mut u64, digits: &mut usize) -> Poll<Result<ChunkedState, ParseError>> {
        macro_rules! or_overflow {
            ($e:expr) => {
                match $e {
                    Some(val) => val,
                    None => return Poll::Ready(Err(ParseError::invalid_chunk("invalid overflow chunked length"))),
                }
            };
        }

        let radix = 16;
        let b = try_next_byte!(src);
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b + 10 - b'a',
            b'A'..=b'F' => b + 10 - b'A',
            b'\t' | b' ' | b';' | b'\r' if *digits == 0 => {
                return Poll::Ready(Err(ParseError::invalid_chunk("invalid chunk size line: missing size")));
            }
            b'\t' | b' ' => return Poll::Ready(Ok(SizeLws)),
            b';' => return Poll::Ready(Ok(Extension)),
            b'\r' => return Poll::Ready(Ok(SizeLf)),
            _ => return Poll::Ready(Err(ParseError::invalid_chunk(format!("invalid chunk size line: unexpected byte {b:#04x}")))),
        };

        *size_per_chunk = or_overflow!(size_per_chunk.checked_mul(radix));
        *size_per_chunk = or_overflow!(size_per_chunk.checked_add(u64::from(digit)));
        *digits += 1;
        Poll::Ready(Ok(Size))
    }

    fn read_size_lws(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            // LWS can follow the chunk size, but no more digits can come
            b'\t' | b' ' => Poll::Ready(Ok(SizeLws)),
            b';' => Poll::Ready(Ok(Extension)),
            b'\r' => Poll::Ready(Ok(SizeLf)),
            _ => Poll::Ready(Err(ParseError::invalid_chunk("invalid chunk size linear white space"))),
        }
    }

    /// Skips chunk extensions up to the CR ending the size line.
    fn read_extension(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        // Extensions "end" at the next CRLF. A plain LF inside one is rejected so the size
        // line can't be terminated differently than the peer thinks.
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(SizeLf)),
            b'\n' => Poll::Ready(Err(ParseError::invalid_chunk("invalid chunk extension contains newline"))),
            _ => Poll::Ready(Ok(Extension)), // no supported extensions
        }
    }

    /// Ends the size line. A zero size leads to the trailer section instead of data.
    fn read_size_lf(src: &mut BytesMut, size_per_chunk: u64) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' if size_per_chunk == 0 => Poll::Ready(Ok(EndCr)),
            b'\n' => Poll::Ready(Ok(Body)),
            _ => Poll::Ready(Err(ParseError::invalid_chunk("invalid chunk size LF"))),
        }
    }

    /// Moves as much of the current chunk as is buffered into `body`.
    fn read_body(src: &mut BytesMut, size_per_chunk: &mut u64, body: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        if src.is_empty() {
            return Poll::Pending;
        }

        // cap remaining bytes at the max capacity of usize
        let remaining = usize::try_from(*size_per_chunk).unwrap_or(usize::MAX);
        let read_size = std::cmp::min(remaining, src.len());

        *size_per_chunk -= read_size as u64;
        body.extend_from_slice(&src.split_to(read_size));
        trace!(len = read_size, "read chunked bytes");

        if *size_per_chunk > 0 { Poll::Ready(Ok(Body)) } else { Poll::Ready(Ok(BodyCr)) }
    }

    fn read_body_cr(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(BodyLf)),
            _ => Poll::Ready(Err(ParseError::invalid_chunk("invalid chunk body CR"))),
        }
    }

    /// Ends a chunk; the next line is a fresh size line.
    fn read_body_lf(src: &mut BytesMut, digits: &mut usize) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => {
                *digits = 0;
                Poll::Ready(Ok(Size))
            }
            _ => Poll::Ready(Err(ParseError::invalid_chunk("invalid chunk body LF"))),
        }
    }

    /// Skips a trailer field after the last chunk.
    fn read_trailer(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(TrailerLf)),
            _ => Poll::Ready(Ok(Trailer)),
        }
    }

    fn read_trailer_lf(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(EndCr)),
            _ => Poll::Ready(Err(ParseError::invalid_chunk("invalid trailer end LF"))),
        }
    }

    /// Reads the final CR of the chunked body, or the first byte of a trailer field.
    fn read_end_cr(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(EndLf)),
            _ => Poll::Ready(Ok(Trailer)),
        }
    }

    fn read_end_lf(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(End)),
            _ => Poll::Ready(Err(ParseError::invalid_chunk("invalid chunk end LF"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIKIPEDIA: &[u8] = b"4\r\nWiki\r\n5\r\npedia\r\nE\r\n in\r\n\r\nchunks.\r\n0\r\n\r\n";

    #[test]
    fn test_basic() {
        let mut buffer: BytesMut = BytesMut::from(&b"10\r\n1234567890abcdef\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let body = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&body[..], b"1234567890abcdef");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_multiple_chunks() {
        let mut buffer = BytesMut::from(WIKIPEDIA);
        let body = ChunkedDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&body[..], b"Wikipedia in\r\n\r\nchunks.");
        assert_eq!(body.len(), 0x4 + 0x5 + 0xE);
    }

    #[test]
    fn test_byte_by_byte() {
        let mut decoder = ChunkedDecoder::new();
        let mut buffer = BytesMut::new();
        let mut result = None;

        for (index, byte) in WIKIPEDIA.iter().enumerate() {
            buffer.extend_from_slice(&[*byte]);
            result = decoder.decode(&mut buffer).unwrap();
            if index + 1 < WIKIPEDIA.len() {
                assert!(result.is_none(), "body completed early at byte {index}");
            }
        }

        assert_eq!(&result.unwrap()[..], b"Wikipedia in\r\n\r\nchunks.");
    }

    #[test]
    fn test_leaves_following_bytes() {
        let mut buffer = BytesMut::from(&b"3\r\nabc\r\n0\r\n\r\nHTTP/1.1 200 OK\r\n"[..]);
        let body = ChunkedDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&body[..], b"abc");
        assert_eq!(&buffer[..], b"HTTP/1.1 200 OK\r\n");
    }

    #[test]
    fn test_chunks_with_extensions() {
        let mut buffer: BytesMut = BytesMut::from(&b"5;chunk-ext=value\r\nhello\r\n0\r\n\r\n"[..]);
        let body = ChunkedDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[test]
    fn test_chunks_with_trailers() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhello\r\n0\r\nTrailer: value\r\n\r\nnext"[..]);
        let body = ChunkedDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&body[..], b"hello");
        assert_eq!(&buffer[..], b"next");
    }

    #[test]
    fn test_incomplete_chunk() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhel"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());

        buffer.extend_from_slice(b"lo\r\n0\r\n\r\n");
        let body = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[test]
    fn test_invalid_chunk_size() {
        let mut buffer: BytesMut = BytesMut::from(&b"xyz\r\n"[..]);
        let result = ChunkedDecoder::new().decode(&mut buffer);
        assert!(matches!(result, Err(ParseError::InvalidChunk { .. })));
    }

    #[test]
    fn test_empty_chunk_size() {
        let mut buffer: BytesMut = BytesMut::from(&b"\r\nabc"[..]);
        let result = ChunkedDecoder::new().decode(&mut buffer);
        assert!(matches!(result, Err(ParseError::InvalidChunk { .. })));
    }

    #[test]
    fn test_overflowing_chunk_size() {
        let mut buffer: BytesMut = BytesMut::from(&b"fffffffffffffffff\r\n"[..]);
        let result = ChunkedDecoder::new().decode(&mut buffer);
        assert!(matches!(result, Err(ParseError::InvalidChunk { .. })));
    }

    #[test]
    fn test_missing_crlf() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhelloBad"[..]);
        let result = ChunkedDecoder::new().decode(&mut buffer);
        assert!(result.is_err());
    }

    #[test]
    fn test_large_chunk() {
        // Create a large chunk (1MB)
        let size = 1024 * 1024;
        let mut data = Vec::with_capacity(size + 16);
        let headers = format!("{size:x}\r\n").into_bytes();
        data.extend(headers);
        data.extend(vec![b'A'; size]);
        data.extend(b"\r\n0\r\n\r\n");

        let mut buffer = BytesMut::from(&data[..]);
        let body = ChunkedDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert_eq!(body.len(), size);
        assert!(body.iter().all(|&b| b == b'A'));
    }

    #[test]
    fn test_zero_size_chunk() {
        let mut buffer: BytesMut = BytesMut::from(&b"0\r\n\r\n"[..]);
        let body = ChunkedDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert!(body.is_empty());
    }
}
