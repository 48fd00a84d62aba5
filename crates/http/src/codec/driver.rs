//! Resumable parse driver
//!
//! [`ParseDriver`] turns any [`Decoder`] into a push parser: the caller hands it byte chunks
//! of arbitrary size as they arrive and gets back every value the decoder could complete so
//! far. Where the chunk boundaries fall has no effect on the values produced.
//!
//! The driver owns the input buffer. Bytes are only ever consumed from its front by the
//! decoder, so a partially received line or body simply stays buffered until the next push.
//!
//! # Example
//!
//! ```
//! use pinhole_http::codec::{MessageDecoder, ParseDriver};
//!
//! let mut driver = ParseDriver::new(MessageDecoder::new());
//! assert!(driver.feed(Some(b"GET / HTTP/1.1\r\nHo")).unwrap().is_empty());
//!
//! let messages = driver.feed(Some(b"st: example.com\r\n\r\n")).unwrap();
//! assert_eq!(messages.len(), 1);
//! assert!(driver.feed(None).unwrap().is_empty());
//! ```

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

/// Initial capacity of the input buffer
const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Drives a [`Decoder`] over a stream delivered in pieces.
///
/// Once the end of the stream has been signalled the driver is finished: the decoder gets one
/// chance to complete what is buffered through [`Decoder::decode_eof`], and any bytes pushed
/// afterwards are ignored.
#[derive(Debug)]
pub struct ParseDriver<D> {
    decoder: D,
    buffer: BytesMut,
    eof: bool,
}

impl<D: Decoder> ParseDriver<D> {
    pub fn new(decoder: D) -> Self {
        Self::with_capacity(decoder, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(decoder: D, capacity: usize) -> Self {
        Self { decoder, buffer: BytesMut::with_capacity(capacity), eof: false }
    }

    /// Appends a chunk to the input buffer, `None` marks the end of the stream.
    pub fn push(&mut self, chunk: Option<&[u8]>) {
        if self.eof {
            return;
        }

        match chunk {
            Some(bytes) => self.buffer.extend_from_slice(bytes),
            None => self.eof = true,
        }
    }

    /// Decodes the next complete value from what has been pushed so far.
    ///
    /// Returns `Ok(None)` when the decoder needs more input, or when the stream has ended and
    /// nothing further can be produced. On error the buffered bytes and the decoder state are
    /// left as they were when the error occurred.
    pub fn decode_next(&mut self) -> Result<Option<D::Item>, D::Error> {
        if self.eof {
            self.decoder.decode_eof(&mut self.buffer)
        } else {
            self.decoder.decode(&mut self.buffer)
        }
    }

    /// Pushes `chunk` and returns every value it completes, in stream order.
    ///
    /// Values completed before an error are lost with it; callers that must act on them use
    /// [`push`](Self::push) and [`decode_next`](Self::decode_next) instead.
    pub fn feed(&mut self, chunk: Option<&[u8]>) -> Result<Vec<D::Item>, D::Error> {
        self.push(chunk);

        let mut items = Vec::new();
        while let Some(item) = self.decode_next()? {
            items.push(item);
        }
        trace!(items = items.len(), buffered = self.buffer.len(), eof = self.eof, "fed parse driver");
        Ok(items)
    }

    /// Returns true once the end of the stream has been pushed.
    pub fn is_finished(&self) -> bool {
        self.eof
    }

    /// Unconsumed input bytes.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}
