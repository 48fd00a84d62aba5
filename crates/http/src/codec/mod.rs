//! HTTP codec module for encoding and decoding HTTP messages
//!
//! This module turns an arbitrarily fragmented byte stream into complete HTTP messages and
//! writes them back out. Every decoder is an explicit state machine implementing
//! [`tokio_util::codec::Decoder`], so it can suspend on any byte and resume when more input
//! arrives.
//!
//! # Architecture
//!
//! - Decoding:
//!   - [`ParseDriver`]: feeds pushed byte chunks to any decoder
//!   - [`MessageDecoder`]: decodes requests and responses on one code path
//!   - Head parsing via the [`header`] module
//!   - Body decoding via the [`body`] module
//!
//! - Encoding:
//!   - [`MessageEncoder`]: writes a message in wire order
//!   - Head encoding via the [`header`] module
//!
//! - Framing:
//!   - [`LengthPrefixedDecoder`] and [`DelimitedDecoder`]: small grammars for the driver
//!
//! # Example
//!
//! ```
//! use pinhole_http::codec::{MessageDecoder, MessageEncoder, ParseDriver};
//! use tokio_util::codec::Encoder;
//! use bytes::BytesMut;
//!
//! let mut driver = ParseDriver::new(MessageDecoder::new());
//! let mut messages = driver.feed(Some(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")).unwrap();
//!
//! let mut encoder = MessageEncoder::new();
//! let mut out = BytesMut::new();
//! encoder.encode(messages.remove(0), &mut out).unwrap();
//! assert_eq!(&out[..], b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok");
//! ```

pub mod body;
pub mod header;

mod driver;
mod framing;
mod message_decoder;
mod message_encoder;

pub use driver::ParseDriver;
pub use framing::{DelimitedDecoder, LengthPrefixedDecoder};
pub use message_decoder::{MessageDecoder, is_chunked};
pub use message_encoder::MessageEncoder;
