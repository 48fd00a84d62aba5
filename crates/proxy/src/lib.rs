//! An intercepting HTTP/1.x proxy
//!
//! `pinhole` forwards every client connection to one fixed upstream host. On the way through,
//! the bytes of both directions are parsed into HTTP messages, each request is paired with
//! the response that answered it, and a few fields are rewritten:
//!
//! - the `Host` header of requests is pointed at the upstream
//! - chunked response bodies are re-framed with `Content-Length`
//!
//! # Example
//!
//! ```no_run
//! use pinhole::{ProxyConfig, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pinhole::ProxyError> {
//!     let server = Server::bind(ProxyConfig::new(8003, "www.example.com", 80)).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`server`]: accepts clients and connects them to the upstream
//! - [`forwarder`]: one task per direction, parsing and forwarding messages
//! - [`correlator`]: FIFO request/response pairing shared by both directions
//! - [`rewrite`]: the field edits applied before forwarding
//! - [`registry`]: bookkeeping of running legs
//! - [`config`]: command line and resolved settings
//!
//! # Limitations
//!
//! - Plain TCP only, no TLS
//! - A response framed by the end of the stream is only forwarded once the upstream closes
//!   the connection
//! - There are no timeouts; an idle leg waits for its source indefinitely

pub mod config;
pub mod correlator;
pub mod forwarder;
pub mod registry;
pub mod rewrite;
pub mod role;
pub mod server;

mod error;

pub use config::{Cli, ProxyConfig};
pub use correlator::{CorrelatedPair, Correlation, Correlator, LogObserver, PairObserver, PendingEntry};
pub use error::ProxyError;
pub use forwarder::Forwarder;
pub use registry::{LegGuard, LegRegistry};
pub use rewrite::Rewriter;
pub use role::Role;
pub use server::Server;
