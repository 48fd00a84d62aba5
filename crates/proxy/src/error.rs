use pinhole_http::protocol::ParseError;
use std::io;
use thiserror::Error;

/// Everything that can end a proxied connection, or the proxy itself.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("transport error: {source}")]
    Transport {
        #[from]
        source: io::Error,
    },

    #[error("can't listen on {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("can't connect to upstream {addr}: {source}")]
    Connect { addr: String, source: io::Error },
}

impl ProxyError {
    pub fn bind<A: ToString>(addr: A, source: io::Error) -> Self {
        Self::Bind { addr: addr.to_string(), source }
    }

    pub fn connect<A: ToString>(addr: A, source: io::Error) -> Self {
        Self::Connect { addr: addr.to_string(), source }
    }

    /// Returns true if the error came from the bytes on the wire rather than the socket.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
