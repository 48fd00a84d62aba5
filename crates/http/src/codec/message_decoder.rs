//! HTTP message decoder module
//!
//! This module decodes complete HTTP/1.x messages, requests and responses alike, from a
//! byte stream. It composes the head decoder and a payload decoder through a small state
//! machine and only yields a message once its body is complete.
//!
//! # Components
//!
//! - [`MessageDecoder`]: Main decoder that coordinates head and payload parsing
//! - Head parsing: Uses [`HeaderDecoder`] for the first line and header block
//! - Payload handling: Uses [`PayloadDecoder`] for bodies if any
//!
//! # Example
//!
//! ```
//! use pinhole_http::codec::MessageDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = MessageDecoder::new();
//! let mut buffer = BytesMut::from("GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
//! let message = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert!(message.is_request());
//! ```

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Body, HeaderFields, HttpMessage, ParseError, StartLine};
use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

/// A decoder for HTTP messages that handles both the head and the payload
///
/// The decoder operates in two phases:
/// 1. Head parsing: Decodes the first line and headers using [`HeaderDecoder`]
/// 2. Payload parsing: If the message has a body, decodes it using [`PayloadDecoder`]
///
/// # State Machine
///
/// The decoder maintains its state through the `payload` field:
/// - `None`: Currently parsing a head
/// - `Some(PendingBody)`: Head parsed, currently collecting the body
#[derive(Debug, Default)]
pub struct MessageDecoder {
    header_decoder: HeaderDecoder,
    payload: Option<PendingBody>,
}

/// A parsed head waiting for its body.
#[derive(Debug)]
struct PendingBody {
    start_line: StartLine,
    headers: HeaderFields,
    decoder: PayloadDecoder,
}

impl PendingBody {
    fn finish(self, body: Bytes) -> HttpMessage {
        trace!(len = body.len(), "decoded message body");
        HttpMessage::new(self.start_line, self.headers, Body::from_bytes(body))
    }
}

impl MessageDecoder {
    /// Creates a new `MessageDecoder` instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the decoder sits exactly between two messages.
    pub fn is_idle(&self) -> bool {
        self.payload.is_none() && self.header_decoder.is_idle()
    }
}

impl Decoder for MessageDecoder {
    type Item = HttpMessage;
    type Error = ParseError;

    /// Attempts to decode one complete HTTP message from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))`: Successfully decoded a message including its body
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.payload.is_none() {
            let Some((start_line, headers)) = self.header_decoder.decode(src)? else {
                return Ok(None);
            };

            match select_payload(&start_line, &headers)? {
                Some(decoder) => {
                    trace!(chunked = decoder.is_chunked(), fix_length = decoder.is_fix_length(), "message has a body");
                    if decoder.is_until_close() {
                        debug!(%start_line, "body is framed by the end of the stream");
                    }
                    self.payload = Some(PendingBody { start_line, headers, decoder });
                }
                None => return Ok(Some(HttpMessage::new(start_line, headers, Body::Absent))),
            }
        }

        // parse payload if have payload decoder
        let Some(pending) = &mut self.payload else {
            return Ok(None);
        };

        match pending.decoder.decode(src)? {
            Some(body) => Ok(self.payload.take().map(|pending| pending.finish(body))),
            None => Ok(None),
        }
    }

    /// Decodes the last message when the stream has ended
    ///
    /// A body framed by the end of the stream is completed here. A stream that ends anywhere
    /// else inside a message is reported as [`ParseError::UnexpectedEof`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }

        if let Some(pending) = &mut self.payload {
            return match pending.decoder.decode_eof(src)? {
                Some(body) => Ok(self.payload.take().map(|pending| pending.finish(body))),
                None => Err(ParseError::unexpected_eof(src.len())),
            };
        }

        if src.is_empty() && self.header_decoder.is_idle() {
            Ok(None)
        } else {
            Err(ParseError::unexpected_eof(src.len()))
        }
    }
}

/// Determines the payload framing of a message from its head.
///
/// # Returns
///
/// - `None` if the message kind carries no body
/// - a fixed-length decoder if `Content-Length` is present
/// - a chunked decoder if `Transfer-Encoding` is `chunked`
/// - a read-until-close decoder otherwise
///
/// # Errors
///
/// Returns `ParseError` if the `Content-Length` value is not a non-negative integer
fn select_payload(start_line: &StartLine, headers: &HeaderFields) -> Result<Option<PayloadDecoder>, ParseError> {
    if !start_line.has_body() {
        return Ok(None);
    }

    if let Some(value) = headers.get(CONTENT_LENGTH.as_str()) {
        let length =
            value.trim().parse::<usize>().map_err(|e| ParseError::invalid_content_length(format!("value {value:?} is not a length: {e}")))?;
        return Ok(Some(PayloadDecoder::fix_length(length)));
    }

    if headers.get(TRANSFER_ENCODING.as_str()).is_some_and(is_chunked) {
        return Ok(Some(PayloadDecoder::chunked()));
    }

    Ok(Some(PayloadDecoder::until_close()))
}

/// Checks if a Transfer-Encoding value declares exactly the chunked coding.
pub fn is_chunked(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("chunked")
}
