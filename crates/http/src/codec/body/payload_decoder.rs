//! Decoder implementation for HTTP message payloads.
//!
//! This module provides a unified decoder for the three body framings a message can use:
//! - Content-Length based payloads
//! - Chunked transfer encoding
//! - Read until the connection closes
//!
//! The framing is chosen by the message decoder from the message head.

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::protocol::ParseError;
use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

/// A unified decoder for handling HTTP message payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

/// Enum representing different payload decoding strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Decode payload using chunked transfer encoding
    Chunked(ChunkedDecoder),

    /// Everything up to the end of the stream is the payload
    UntilClose,
}

impl PayloadDecoder {
    /// Creates a `PayloadDecoder` for chunked transfer encoding.
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    /// Creates a `PayloadDecoder` for a fixed-length payload.
    ///
    /// # Arguments
    /// * `size` - The expected content length in bytes
    pub fn fix_length(size: usize) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a `PayloadDecoder` whose payload ends with the stream.
    pub fn until_close() -> Self {
        Self { kind: Kind::UntilClose }
    }

    /// Returns whether this decoder handles chunked transfer encoding.
    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    /// Returns whether this decoder waits for the end of the stream.
    pub fn is_until_close(&self) -> bool {
        matches!(self.kind, Kind::UntilClose)
    }

    /// Returns whether this decoder handles fixed-length payloads.
    pub fn is_fix_length(&self) -> bool {
        matches!(self.kind, Kind::Length(_))
    }
}

/// Delegates to the appropriate decoder based on the payload framing.
impl Decoder for PayloadDecoder {
    type Item = Bytes;
    type Error = ParseError;

    /// Decodes the whole payload from the input buffer.
    ///
    /// A read-until-close payload never completes here; see [`Decoder::decode_eof`].
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
            Kind::UntilClose => Ok(None),
        }
    }

    /// Finishes the payload at the end of the stream.
    ///
    /// A read-until-close payload takes every remaining byte. Any other framing that is still
    /// incomplete when the stream ends is an error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Kind::UntilClose = self.kind {
            return Ok(Some(src.split().freeze()));
        }

        match self.decode(src)? {
            Some(bytes) => Ok(Some(bytes)),
            None => Err(ParseError::unexpected_eof(src.len())),
        }
    }
}
