//! TCP listener and per-connection setup
//!
//! Every accepted client gets its own upstream connection, [`Correlator`] and pair of
//! [`Forwarder`] tasks, one per direction. A failing connection never stops the listener.

use crate::config::ProxyConfig;
use crate::correlator::{Correlator, LogObserver, PairObserver};
use crate::error::ProxyError;
use crate::forwarder::Forwarder;
use crate::registry::LegRegistry;
use crate::rewrite::Rewriter;
use crate::role::Role;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

pub struct Server {
    listener: TcpListener,
    config: ProxyConfig,
    rewriter: Arc<Rewriter>,
    observer: Arc<dyn PairObserver>,
    registry: LegRegistry,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server").field("config", &self.config).field("registry", &self.registry).finish_non_exhaustive()
    }
}

impl Server {
    /// Binds the listening socket described by `config`.
    pub async fn bind(config: ProxyConfig) -> Result<Self, ProxyError> {
        let addr = config.listen_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| ProxyError::bind(addr, e))?;
        let rewriter = Arc::new(Rewriter::for_upstream(&config));
        Ok(Self { listener, config, rewriter, observer: Arc::new(LogObserver), registry: LegRegistry::new() })
    }

    /// Replaces the default [`LogObserver`] for every connection accepted afterwards.
    pub fn with_observer(mut self, observer: Arc<dyn PairObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Counts the legs of every connection accepted afterwards in `registry`.
    pub fn with_registry(mut self, registry: LegRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ProxyError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts clients until the task is dropped.
    pub async fn run(self) {
        info!(
            listen = %self.config.listen_addr(),
            upstream = %self.config.upstream_addr(),
            host = self.rewriter.host_header(),
            "start forwarding"
        );

        loop {
            let (client, peer) = match self.listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            info!(%peer, "accepted client");
            let session = Session {
                upstream_addr: self.config.upstream_addr(),
                rewriter: Arc::clone(&self.rewriter),
                observer: Arc::clone(&self.observer),
                registry: self.registry.clone(),
            };

            tokio::spawn(async move {
                if let Err(e) = session.start(client).await {
                    error!(%peer, cause = %e, "dropping client connection");
                }
            });
        }
    }
}

/// Everything one accepted client needs, detached from the listener.
struct Session {
    upstream_addr: String,
    rewriter: Arc<Rewriter>,
    observer: Arc<dyn PairObserver>,
    registry: LegRegistry,
}

impl Session {
    async fn start(self, client: TcpStream) -> Result<(), ProxyError> {
        let upstream = TcpStream::connect(self.upstream_addr.as_str()).await.map_err(|e| ProxyError::connect(&self.upstream_addr, e))?;

        let correlator = Arc::new(Correlator::new(Arc::clone(&self.observer)));
        let (client_reader, client_writer) = client.into_split();
        let (upstream_reader, upstream_writer) = upstream.into_split();

        self.spawn_leg(Forwarder::new(client_reader, upstream_writer, Role::ClientToUpstream, Arc::clone(&self.rewriter), Arc::clone(&correlator)));
        self.spawn_leg(Forwarder::new(upstream_reader, client_writer, Role::UpstreamToClient, Arc::clone(&self.rewriter), correlator));
        Ok(())
    }

    fn spawn_leg<R, W>(&self, forwarder: Forwarder<R, W>)
    where
        R: tokio::io::AsyncRead + Unpin + Send + 'static,
        W: tokio::io::AsyncWrite + Unpin + Send + 'static,
    {
        let guard = self.registry.enter(forwarder.role());
        tokio::spawn(async move {
            if let Err(e) = forwarder.run().await {
                error!(role = %guard.role(), cause = %e, "leg failed");
            }
            drop(guard);
        });
    }
}
