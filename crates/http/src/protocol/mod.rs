//! Message model shared by the decoder, the encoder and the proxy.
//!
//! - [`HttpMessage`]: a complete request or response, tagged by its [`StartLine`]
//! - [`HeaderFields`]: insertion-ordered header fields
//! - [`Body`]: absent, empty or full body bytes
//! - [`ParseError`]: everything the decoders can reject

mod message;
pub use message::Body;
pub use message::HttpMessage;
pub use message::RequestLine;
pub use message::StartLine;
pub use message::StatusLine;

mod header;
pub use header::HeaderField;
pub use header::HeaderFields;

mod version;
pub use version::parse_version;
pub use version::version_str;

mod error;
pub use error::ParseError;

pub(crate) mod latin1;
