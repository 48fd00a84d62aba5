//! Message head processing: the first line plus the header block
//!
//! - [`HeaderDecoder`]: incremental, line-at-a-time head decoder
//!   - Classifies the first line as a request line or a status line
//!   - Folds continuation lines into the previous field
//!   - Keeps partially received and rejected lines in the buffer
//!   - Bounds the head size and the number of fields
//!
//! - [`HeaderEncoder`]: writes a head back in wire order

mod header_decoder;
mod header_encoder;

pub use header_decoder::{HeaderDecoder, MAX_HEAD_BYTES, MAX_HEADER_NUM};
pub use header_encoder::HeaderEncoder;
