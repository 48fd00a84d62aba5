//! Byte <-> text conversion for the textual parts of a message.
//!
//! Request targets, reason phrases and header fields are decoded as ISO-8859-1 so that
//! every byte maps to exactly one `char` and re-encoding reproduces the wire bytes.

use bytes::{BufMut, BytesMut};

pub(crate) fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

pub(crate) fn encode_into(str: &str, dst: &mut BytesMut) {
    if str.is_ascii() {
        dst.put_slice(str.as_bytes());
        return;
    }

    for c in str.chars() {
        dst.put_u8(u8::try_from(u32::from(c)).unwrap_or(b'?'));
    }
}
