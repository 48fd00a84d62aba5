//! HTTP body decoding for request and response payloads
//!
//! Each decoder buffers until the complete body is available and then yields it as one
//! `Bytes` value; nothing is handed out before the body is complete.
//!
//! - [`ChunkedDecoder`]: handles chunked transfer encoded payloads
//! - [`LengthDecoder`]: processes fixed-length payloads
//! - [`PayloadDecoder`]: selects one of the above, or reads until the stream closes

mod chunked_decoder;
mod length_decoder;
mod payload_decoder;

pub use chunked_decoder::ChunkedDecoder;
pub use length_decoder::LengthDecoder;
pub use payload_decoder::PayloadDecoder;
