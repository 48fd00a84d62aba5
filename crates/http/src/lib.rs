//! Incremental HTTP/1.x message parsing
//!
//! This crate reconstructs HTTP requests and responses from a byte stream that arrives in
//! pieces of any size, without blocking and without assuming that reads line up with message
//! boundaries. It is the parsing half of the `pinhole` intercepting proxy.
//!
//! # Features
//!
//! - Requests and responses decoded on a single code path, told apart by the first line
//! - Header continuation lines, case-insensitive lookup, insertion order kept
//! - Content-Length, chunked and read-until-close bodies
//! - A generic push driver usable with any `tokio_util` decoder
//! - Wire-order encoding of decoded messages
//!
//! # Example
//!
//! ```
//! use pinhole_http::codec::{MessageDecoder, ParseDriver};
//!
//! let mut driver = ParseDriver::new(MessageDecoder::new());
//!
//! let mut messages = Vec::new();
//! for piece in [&b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chu"[..], b"nked\r\n\r\n4\r\nWiki\r\n0\r\n\r\n"] {
//!     messages.extend(driver.feed(Some(piece)).unwrap());
//! }
//!
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].body.as_bytes(), b"Wiki");
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: the message model and [`protocol::ParseError`]
//! - [`codec`]: the decoders, the encoder and the [`codec::ParseDriver`]
//!
//! # Limitations
//!
//! - HTTP/1.x only
//! - Whether a message has a body is decided by a short list: `POST`, `PUT` and `PATCH`
//!   requests, `200` and `404` responses
//! - Chunked trailers are skipped, not parsed
//! - A body framed by the end of the stream only completes when the stream closes

pub mod codec;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
