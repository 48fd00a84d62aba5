//! One direction of a proxied connection
//!
//! A [`Forwarder`] reads raw bytes from its source, rebuilds the HTTP messages they carry,
//! reports each message to the connection's [`Correlator`], rewrites it for the peer and
//! writes it out. Only complete messages are ever written.

use crate::correlator::Correlator;
use crate::error::ProxyError;
use crate::rewrite::Rewriter;
use crate::role::Role;
use futures::{SinkExt, StreamExt};
use pinhole_http::codec::{MessageDecoder, MessageEncoder, ParseDriver};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedWrite;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, trace, warn};

/// Size of a single read from the source
const READ_BUFFER_SIZE: usize = 8 * 1024;

pub struct Forwarder<R, W> {
    source: ReaderStream<R>,
    framed_write: FramedWrite<W, MessageEncoder>,
    driver: ParseDriver<MessageDecoder>,
    role: Role,
    rewriter: Arc<Rewriter>,
    correlator: Arc<Correlator>,
}

impl<R, W> std::fmt::Debug for Forwarder<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder").field("role", &self.role).field("buffered", &self.driver.buffer().len()).finish_non_exhaustive()
    }
}

impl<R, W> Forwarder<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, role: Role, rewriter: Arc<Rewriter>, correlator: Arc<Correlator>) -> Self {
        Self {
            source: ReaderStream::with_capacity(reader, READ_BUFFER_SIZE),
            framed_write: FramedWrite::new(writer, MessageEncoder::new()),
            driver: ParseDriver::new(MessageDecoder::new()),
            role,
            rewriter,
            correlator,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Forwards until the source closes or an error occurs.
    ///
    /// The peer's write half is shut down in every case, so the peer sees the end of this
    /// direction. The other leg of the connection is left running.
    pub async fn run(mut self) -> Result<(), ProxyError> {
        let result = self.pump().await;

        if let Err(e) = self.framed_write.close().await {
            warn!(role = %self.role, cause = %e, "failed to shut down peer write half");
        }

        match &result {
            Ok(()) => info!(role = %self.role, "source closed, leg finished"),
            Err(e) => debug!(role = %self.role, cause = %e, "leg aborted"),
        }
        result
    }

    async fn pump(&mut self) -> Result<(), ProxyError> {
        loop {
            let chunk = match self.source.next().await {
                Some(Ok(bytes)) => Some(bytes),
                Some(Err(e)) if e.kind() == io::ErrorKind::ConnectionReset => None,
                Some(Err(e)) => return Err(e.into()),
                None => None,
            };

            let finished = chunk.is_none();
            self.on_bytes_received(chunk.as_deref()).await?;
            if finished {
                return Ok(());
            }
        }
    }

    /// Feeds one read to the parser and forwards every message it completes.
    ///
    /// `None` marks the end of the source. Messages completed before a parse error are still
    /// forwarded; the error is returned afterwards.
    pub async fn on_bytes_received(&mut self, chunk: Option<&[u8]>) -> Result<(), ProxyError> {
        trace!(role = %self.role, len = ?chunk.map(<[u8]>::len), "received bytes");
        self.driver.push(chunk);

        let outcome = loop {
            match self.driver.decode_next() {
                Ok(Some(mut message)) => {
                    self.correlator.submit(message.clone(), self.role);
                    self.rewriter.rewrite(self.role, &mut message);
                    self.framed_write.feed(message).await?;
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(ProxyError::from(e)),
            }
        };

        self.framed_write.flush().await?;
        outcome
    }
}
