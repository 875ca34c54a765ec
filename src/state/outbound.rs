//! Outbound queue items and late-bound numeric replies.
//!
//! A numeric is queued together with a handle on the session's nick cell.
//! The target nick is read when the connection flushes its outbox, so a
//! reply built before a nick change still names the nick the client has at
//! write time.

use std::sync::Arc;

use parking_lot::RwLock;
use tinyirc_proto::{Message, Numeric, Prefix};

/// Shared, mutable current nick of one connection.
#[derive(Clone, Debug, Default)]
pub struct NickCell(Arc<RwLock<Option<String>>>);

impl NickCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().clone()
    }

    /// Replace the nick, returning the previous one.
    pub fn replace(&self, nick: Option<String>) -> Option<String> {
        std::mem::replace(&mut *self.0.write(), nick)
    }

    /// Run `f` against the current nick without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(Option<&str>) -> R) -> R {
        f(self.0.read().as_deref())
    }
}

/// A numeric waiting for its target.
#[derive(Debug)]
pub struct LazyNumeric {
    numeric: Numeric,
    prefix: Prefix,
    target: NickCell,
}

impl LazyNumeric {
    /// Bind to the nick as of now.
    pub fn resolve(self) -> Message {
        let Self {
            numeric,
            prefix,
            target,
        } = self;
        target.with(|nick| numeric.bind(Some(prefix), nick))
    }
}

/// One entry of a connection's outbox.
#[derive(Debug)]
pub enum Outbound {
    Message(Message),
    Numeric(LazyNumeric),
}

impl Outbound {
    pub fn resolve(self) -> Message {
        match self {
            Outbound::Message(msg) => msg,
            Outbound::Numeric(numeric) => numeric.resolve(),
        }
    }
}

impl From<Message> for Outbound {
    fn from(msg: Message) -> Self {
        Outbound::Message(msg)
    }
}

/// Per-connection numeric factory: server prefix plus the live nick cell.
#[derive(Clone, Debug)]
pub struct Numerics {
    prefix: Prefix,
    nick: NickCell,
}

impl Numerics {
    pub fn new(server_name: &str, nick: NickCell) -> Self {
        Self {
            prefix: Prefix::ServerName(server_name.to_owned()),
            nick,
        }
    }

    pub fn bind(&self, numeric: Numeric) -> LazyNumeric {
        LazyNumeric {
            numeric,
            prefix: self.prefix.clone(),
            target: self.nick.clone(),
        }
    }
}
