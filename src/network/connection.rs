//! Connection - drives one client's session.
//!
//! Each Connection runs in its own Tokio task and owns its [`Session`]:
//!
//! ```text
//!    ┌──────────────────────────────────────────────────┐
//!    │               Connection Task                    │
//!    │                                                  │
//!    │  FramedRead ──▶ Registry::dispatch ──┐           │
//!    │  (LineCodec)                         │           │
//!    │                                      ▼           │
//!    │  Mailbox ────▶ Task(&mut Session) ─▶ outbox ──▶ FramedWrite
//!    │                                      ▲           │ (IrcCodec)
//!    │  idle timer ─▶ on_idle ──────────────┘           │
//!    └──────────────────────────────────────────────────┘
//! ```
//!
//! The outbox is flushed after every event, so numerics pick up the nick in
//! effect at that moment.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tinyirc_proto::{IrcCodec, LineCodec, Message, ProtocolError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{Instant, sleep_until};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, debug, error, info};

use super::resolve::HostResolver;
use crate::config::Config;
use crate::error::HandlerResult;
use crate::handlers::{Registry, on_disconnect, on_idle, quit, settle};
use crate::metrics;
use crate::state::{MAILBOX_CAPACITY, Mailbox, Matrix, Session, Uid};
use crate::telemetry::spans;

/// Per-connection knobs taken from the configuration.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub max_line_length: usize,
    pub ping_interval: Duration,
    pub ping_timeout: Duration,
    pub mailbox_capacity: usize,
}

impl ConnectionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_line_length: config.limits.max_line_length,
            ping_interval: config.server.idle_timeouts.ping_interval(),
            ping_timeout: config.server.idle_timeouts.ping_timeout(),
            mailbox_capacity: MAILBOX_CAPACITY,
        }
    }
}

/// A client connection handler.
pub struct Connection<S> {
    uid: Uid,
    addr: SocketAddr,
    stream: S,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
    settings: Arc<ConnectionSettings>,
    resolver: HostResolver,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    pub fn new(
        uid: Uid,
        stream: S,
        addr: SocketAddr,
        matrix: Arc<Matrix>,
        registry: Arc<Registry>,
        settings: Arc<ConnectionSettings>,
        resolver: HostResolver,
    ) -> Self {
        Self {
            uid,
            addr,
            stream,
            matrix,
            registry,
            settings,
            resolver,
        }
    }

    /// Run the connection until the client leaves or is closed.
    pub async fn run(self) {
        let span = spans::connection(&self.uid, &self.addr);
        self.serve().instrument(span).await
    }

    async fn serve(self) {
        let Self {
            uid,
            addr,
            stream,
            matrix,
            registry,
            settings,
            resolver,
        } = self;

        let hostname = resolver.hostname(addr.ip()).await;
        info!(host = %hostname, server = %matrix.server.name, "Client connected");

        let (read_half, write_half) = tokio::io::split(stream);
        let mut reader = FramedRead::new(read_half, LineCodec::with_max_len(settings.max_line_length));
        let mut writer = FramedWrite::new(write_half, IrcCodec::new());

        let (mailbox, mut tasks) = Mailbox::new(settings.mailbox_capacity);
        let mut session = Session::new(uid, addr, hostname, matrix, mailbox);
        let mut deadline = Instant::now() + settings.ping_interval;

        loop {
            let outcome = tokio::select! {
                line = reader.next() => match line {
                    Some(Ok(line)) => {
                        deadline = Instant::now() + settings.ping_interval;
                        handle_line(&registry, &mut session, &line)
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "Read error");
                        break;
                    }
                    None => {
                        info!("Client disconnected");
                        break;
                    }
                },

                Some(task) = tasks.recv() => {
                    let result = task(&mut session);
                    settle(&mut session, "*", result)
                }

                _ = sleep_until(deadline) => {
                    on_idle(&mut session);
                    deadline = Instant::now() + settings.ping_timeout;
                    Ok(())
                }
            };

            if let Err(e) = outcome {
                error!(error = %e, "Fatal handler error, closing connection");
                quit(&mut session, "Internal error");
                session.close("Internal error");
            }

            if let Err(e) = flush(&mut writer, &mut session).await {
                match e {
                    ProtocolError::Io(e) => debug!(error = %e, "Write error"),
                    e => error!(error = %e, "Refusing to send malformed message"),
                }
                break;
            }

            if session.is_closing() {
                debug!(reason = ?session.close_reason(), "Closing connection");
                break;
            }
        }

        on_disconnect(&mut session);
        info!(nick = ?session.nick(), "Connection finished");
    }
}

fn handle_line(registry: &Registry, session: &mut Session, line: &str) -> HandlerResult {
    // Even a line we cannot use proves the peer is alive.
    session.ping_sent.clear();
    if line.is_empty() {
        return Ok(());
    }
    match Message::parse(line) {
        Ok(msg) => {
            debug!(raw = %line, "Received message");
            registry.dispatch(session, &msg)
        }
        Err(e) => {
            debug!(raw = %line, error = %e, "Unparseable line dropped");
            Ok(())
        }
    }
}

/// Write everything the session has queued, then flush the socket.
async fn flush<W>(
    writer: &mut FramedWrite<W, IrcCodec>,
    session: &mut Session,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    if !session.has_output() {
        return Ok(());
    }
    while let Some(msg) = session.next_outbound() {
        writer.feed(msg).await?;
        metrics::inc_counter(&metrics::MESSAGES_SENT);
    }
    writer.flush().await
}
