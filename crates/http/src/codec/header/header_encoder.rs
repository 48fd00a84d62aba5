//! HTTP head encoder for writing a message's first line and header block
//!
//! The head is written exactly as it is held in memory: the first line, then each field as
//! `Name: Value` in insertion order, then the empty line. No field is added or normalised
//! here, so a decoded head re-encodes to the bytes it was decoded from (modulo the optional
//! whitespace after each colon, which is always written as a single space).

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{HeaderFields, StartLine, latin1, version_str};

/// Initial buffer size reserved for head serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for the head of an [`HttpMessage`](crate::protocol::HttpMessage).
#[derive(Debug, Default)]
pub struct HeaderEncoder;

impl Encoder<(&StartLine, &HeaderFields)> for HeaderEncoder {
    type Error = std::io::Error;

    fn encode(&mut self, item: (&StartLine, &HeaderFields), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (start_line, headers) = item;

        dst.reserve(INIT_HEADER_SIZE);
        match start_line {
            StartLine::Request(line) => {
                dst.put_slice(line.method.as_str().as_bytes());
                dst.put_u8(b' ');
                latin1::encode_into(&line.path, dst);
                dst.put_u8(b' ');
                dst.put_slice(version_str(line.version).as_bytes());
            }
            StartLine::Response(line) => {
                dst.put_slice(version_str(line.version).as_bytes());
                dst.put_u8(b' ');
                dst.put_slice(line.status.as_str().as_bytes());
                if let Some(reason) = &line.reason {
                    dst.put_u8(b' ');
                    latin1::encode_into(reason, dst);
                }
            }
        }
        dst.put_slice(b"\r\n");

        for field in headers.iter() {
            latin1::encode_into(field.name(), dst);
            dst.put_slice(b": ");
            latin1::encode_into(field.value(), dst);
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
