//! Edits applied to messages on their way through the proxy
//!
//! - requests: an existing `Host` header is pointed at the upstream
//! - responses: a chunked body, already decoded in full, is re-framed with `Content-Length`

use crate::config::ProxyConfig;
use crate::role::Role;
use http::header::{HOST, TRANSFER_ENCODING};
use pinhole_http::codec::is_chunked;
use pinhole_http::protocol::HttpMessage;
use tracing::trace;

/// Rewrites messages for the leg they are forwarded on.
#[derive(Debug, Clone)]
pub struct Rewriter {
    host_header: String,
}

impl Rewriter {
    pub fn new(host_header: impl Into<String>) -> Self {
        Self { host_header: host_header.into() }
    }

    pub fn for_upstream(config: &ProxyConfig) -> Self {
        Self::new(config.host_header())
    }

    pub fn host_header(&self) -> &str {
        &self.host_header
    }

    pub fn rewrite(&self, role: Role, message: &mut HttpMessage) {
        match role {
            Role::ClientToUpstream => self.rewrite_request(message),
            Role::UpstreamToClient => Self::rewrite_response(message),
        }
    }

    fn rewrite_request(&self, message: &mut HttpMessage) {
        if message.headers.set_existing(HOST.as_str(), self.host_header.as_str()) {
            trace!(host = %self.host_header, "rewrote host header");
        }
    }

    /// The body was collected by the chunked decoder, so the chunk framing is gone and the
    /// length is known.
    fn rewrite_response(message: &mut HttpMessage) {
        if message.body.is_absent() || !message.headers.get(TRANSFER_ENCODING.as_str()).is_some_and(is_chunked) {
            return;
        }

        message.headers.remove(TRANSFER_ENCODING.as_str());
        let length = message.body.len();
        message.headers.insert("Content-Length", length.to_string());
        trace!(length, "re-framed chunked body");
    }
}
