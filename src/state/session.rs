//! Per-connection protocol state and the confinement primitive.
//!
//! A [`Session`] is owned by exactly one connection task. Everything that
//! reads or writes it runs on that task, either directly while a command is
//! dispatched or as a [`Task`] drained from the connection's [`Mailbox`].
//! Results of directory calls re-enter through [`Session::enqueue`].

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::task::noop_waker_ref;
use tinyirc_proto::{Message, Numeric, Prefix};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use super::directory::User;
use super::latch::Latch;
use super::matrix::Matrix;
use super::outbound::{NickCell, Numerics, Outbound};
use super::uid::Uid;
use crate::error::HandlerResult;
use crate::metrics;

/// A continuation to run on a connection's own task.
pub type Task = Box<dyn FnOnce(&mut Session) -> HandlerResult + Send>;

/// Default depth of a connection's task queue.
pub const MAILBOX_CAPACITY: usize = 1024;

/// Sending half of a connection's task queue.
#[derive(Clone, Debug)]
pub struct Mailbox {
    tx: mpsc::Sender<Task>,
}

impl Mailbox {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Task>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Post a continuation, waiting for queue space.
    ///
    /// If the connection has ended the task is discarded.
    pub async fn post(&self, task: Task) {
        let _ = self.tx.send(task).await;
    }

    /// Queue a message for the owning connection's outbox.
    ///
    /// A full queue drops the message; a closed one means the connection
    /// is gone and the message is not needed.
    pub fn deliver(&self, msg: Message) -> bool {
        let command = msg.command.clone();
        let task: Task = Box::new(move |session| {
            session.send(msg);
            Ok(())
        });
        match self.tx.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(command = %command, "Connection queue full, message dropped");
                metrics::inc_counter(&metrics::DELIVERIES_DROPPED);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// NICK/USER values collected before registration completes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistrationData {
    pub nick: Option<String>,
    pub username: Option<String>,
    pub realname: Option<String>,
}

impl RegistrationData {
    pub fn got_nick(&self) -> bool {
        self.nick.is_some()
    }

    pub fn got_user(&self) -> bool {
        self.username.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.got_nick() && self.got_user()
    }
}

/// Protocol state of one client connection.
pub struct Session {
    pub uid: Uid,
    pub remote_addr: SocketAddr,
    /// Resolved once at accept time.
    pub hostname: String,
    pub username: Option<String>,
    pub realname: Option<String>,
    /// Directory handle, present once registration has been requested.
    pub user: Option<User>,
    pub registered: Latch,
    pub quitted: Latch,
    pub ping_sent: Latch,
    /// In-flight registration. Taken exactly once when it completes.
    pub registration: Option<RegistrationData>,
    /// A NICK change is waiting on the user directory.
    pub changing_nick: bool,
    pub matrix: Arc<Matrix>,
    nick: NickCell,
    numerics: Numerics,
    outbox: VecDeque<Outbound>,
    mailbox: Mailbox,
    closing: Option<String>,
}

impl Session {
    pub fn new(
        uid: Uid,
        remote_addr: SocketAddr,
        hostname: String,
        matrix: Arc<Matrix>,
        mailbox: Mailbox,
    ) -> Self {
        let nick = NickCell::new();
        let numerics = Numerics::new(&matrix.server.name, nick.clone());
        Self {
            uid,
            remote_addr,
            hostname,
            username: None,
            realname: None,
            user: None,
            registered: Latch::new(),
            quitted: Latch::new(),
            ping_sent: Latch::new(),
            registration: None,
            changing_nick: false,
            matrix,
            nick,
            numerics,
            outbox: VecDeque::new(),
            mailbox,
            closing: None,
        }
    }

    pub fn nick(&self) -> Option<String> {
        self.nick.get()
    }

    pub fn nick_cell(&self) -> &NickCell {
        &self.nick
    }

    /// Adopt a new nick, returning the previous one.
    pub fn set_nick(&self, nick: Option<String>) -> Option<String> {
        self.nick.replace(nick)
    }

    pub fn server_name(&self) -> &str {
        &self.matrix.server.name
    }

    pub fn server_prefix(&self) -> Prefix {
        Prefix::ServerName(self.matrix.server.name.clone())
    }

    /// `nick!~user@host` as currently known.
    pub fn hostmask(&self) -> Prefix {
        let nick = self.nick().unwrap_or_else(|| "*".to_owned());
        let user = self
            .username
            .as_deref()
            .map(|u| format!("~{u}"))
            .unwrap_or_default();
        Prefix::new(nick, user, self.hostname.clone())
    }

    /// Get or create the in-flight registration record.
    pub fn registration_mut(&mut self) -> &mut RegistrationData {
        self.registration.get_or_insert_with(RegistrationData::default)
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    // === Output ===

    pub fn send(&mut self, msg: Message) {
        self.outbox.push_back(Outbound::Message(msg));
    }

    /// Queue a numeric; its target nick is read when it is flushed.
    pub fn send_numeric(&mut self, numeric: Numeric) {
        let lazy = self.numerics.bind(numeric);
        self.outbox.push_back(Outbound::Numeric(lazy));
    }

    /// Pop the next outbound message with its target bound.
    pub fn next_outbound(&mut self) -> Option<Message> {
        self.outbox.pop_front().map(Outbound::resolve)
    }

    pub fn has_output(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Send `ERROR :Closing Link` and mark the connection for closing once
    /// the outbox is flushed. Only the first call has an effect.
    pub fn close(&mut self, reason: &str) {
        if self.closing.is_some() {
            return;
        }
        let text = format!("Closing Link: {} ({})", self.hostname, reason);
        self.send(Message::error(text));
        self.closing = Some(reason.to_owned());
    }

    pub fn is_closing(&self) -> bool {
        self.closing.is_some()
    }

    pub fn close_reason(&self) -> Option<&str> {
        self.closing.as_deref()
    }

    // === Confinement ===

    /// Run `cont` with the output of `fut` on this connection's task.
    ///
    /// A future that is already complete is continued inline. Otherwise it
    /// is driven on the runtime and `cont` is posted to the mailbox, where it
    /// runs in completion order with everything else for this connection.
    pub fn enqueue<T, F, C>(&mut self, fut: F, cont: C) -> HandlerResult
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
        C: FnOnce(&mut Session, T) -> HandlerResult + Send + 'static,
    {
        let mut fut = Box::pin(fut);
        let mut cx = Context::from_waker(noop_waker_ref());
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(value) => cont(self, value),
            Poll::Pending => {
                let mailbox = self.mailbox.clone();
                tokio::spawn(async move {
                    let value = fut.await;
                    mailbox
                        .post(Box::new(move |session| cont(session, value)))
                        .await;
                });
                Ok(())
            }
        }
    }
}
