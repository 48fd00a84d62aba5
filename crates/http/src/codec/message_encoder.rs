//! HTTP message encoder
//!
//! Writes a complete [`HttpMessage`] in wire order: the head through [`HeaderEncoder`], then
//! the body bytes if the message carries any. Body framing headers are written as they are
//! held; callers that change the body are responsible for keeping them consistent.

use crate::codec::header::HeaderEncoder;
use crate::protocol::HttpMessage;
use bytes::BytesMut;
use std::io;
use tokio_util::codec::Encoder;
use tracing::trace;

/// Encoder for whole HTTP messages.
#[derive(Debug, Default)]
pub struct MessageEncoder {
    header_encoder: HeaderEncoder,
}

impl MessageEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Encoder<HttpMessage> for MessageEncoder {
    type Error = io::Error;

    fn encode(&mut self, item: HttpMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.header_encoder.encode((&item.start_line, &item.headers), dst)?;

        let body = item.body.as_bytes();
        if !body.is_empty() {
            dst.extend_from_slice(body);
        }
        trace!(start_line = %item.start_line, body_len = body.len(), "encoded message");
        Ok(())
    }
}
