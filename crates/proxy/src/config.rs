//! Command line handling and the resolved proxy configuration
//!
//! ```text
//! pinhole                      listen on 8003, forward to www.example.com:80
//! pinhole 80 webserver         listen on 80, forward to webserver:80
//! pinhole 23 localhost 2323    listen on 23, forward to localhost:2323
//! ```

use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use tracing::Level;

pub const DEFAULT_LISTEN_PORT: u16 = 8003;
pub const DEFAULT_UPSTREAM_HOST: &str = "www.example.com";
pub const DEFAULT_UPSTREAM_PORT: u16 = 80;

/// Forwards a local port to a remote host, printing every request next to its response.
#[derive(Parser, Debug)]
#[command(name = "pinhole", version, about, long_about = None)]
pub struct Cli {
    /// Port to listen on; the upstream port too unless NEW_PORT is given
    #[arg(requires = "host")]
    pub port: Option<u16>,

    /// Upstream host to forward connections to
    pub host: Option<String>,

    /// Upstream port, when it differs from PORT
    #[arg(requires = "host")]
    pub new_port: Option<u16>,

    /// Maximum level of the log output
    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

/// Immutable proxy settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub listen_port: u16,
    pub upstream_host: String,
    pub upstream_port: u16,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LISTEN_PORT, DEFAULT_UPSTREAM_HOST, DEFAULT_UPSTREAM_PORT)
    }
}

impl ProxyConfig {
    pub fn new(listen_port: u16, upstream_host: impl Into<String>, upstream_port: u16) -> Self {
        Self { listen_port, upstream_host: upstream_host.into(), upstream_port }
    }

    /// Address the listener binds, on every interface.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.listen_port))
    }

    /// Upstream address as `host:port`, resolved when a connection is made.
    pub fn upstream_addr(&self) -> String {
        format!("{}:{}", self.upstream_host, self.upstream_port)
    }

    /// Value forwarded requests carry in their `Host` header; the default port 80 is left out.
    pub fn host_header(&self) -> String {
        if self.upstream_port == DEFAULT_UPSTREAM_PORT { self.upstream_host.clone() } else { self.upstream_addr() }
    }
}

impl From<&Cli> for ProxyConfig {
    fn from(cli: &Cli) -> Self {
        match (cli.port, &cli.host) {
            (Some(port), Some(host)) => Self::new(port, host.clone(), cli.new_port.unwrap_or(port)),
            _ => Self::default(),
        }
    }
}
