//! Contracts of the user and channel directories.
//!
//! The protocol core only sees these traits. Their results are futures that
//! may finish on any worker thread; handlers resume on their own connection
//! through [`Session::enqueue`](super::Session::enqueue).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use tinyirc_proto::{Message, Prefix};

use super::outbound::NickCell;
use super::session::Mailbox;
use super::uid::Uid;
use crate::error::DirectoryError;

/// A registered client as the directories see it.
///
/// Cheap to clone. The nick is shared with the owning session, so a handle
/// held by a channel always reports the current nick.
#[derive(Clone)]
pub struct User(Arc<UserInner>);

struct UserInner {
    uid: Uid,
    nick: NickCell,
    username: String,
    realname: String,
    hostname: String,
    mailbox: Mailbox,
}

impl User {
    pub fn new(
        uid: Uid,
        nick: NickCell,
        username: String,
        realname: String,
        hostname: String,
        mailbox: Mailbox,
    ) -> Self {
        Self(Arc::new(UserInner {
            uid,
            nick,
            username,
            realname,
            hostname,
            mailbox,
        }))
    }

    pub fn uid(&self) -> &str {
        &self.0.uid
    }

    pub fn nick(&self) -> String {
        self.0.nick.get().unwrap_or_default()
    }

    pub fn username(&self) -> &str {
        &self.0.username
    }

    pub fn realname(&self) -> &str {
        &self.0.realname
    }

    pub fn hostname(&self) -> &str {
        &self.0.hostname
    }

    /// `nick!~user@host`
    pub fn hostmask(&self) -> Prefix {
        self.hostmask_as(self.nick())
    }

    /// The hostmask with `nick` in place of the session's current nick.
    pub fn hostmask_as(&self, nick: impl Into<String>) -> Prefix {
        Prefix::new(nick, format!("~{}", self.0.username), self.0.hostname.clone())
    }

    /// Queue `msg` for this user's connection. Returns `false` if the
    /// connection is gone or its queue is full.
    pub fn deliver(&self, msg: Message) -> bool {
        self.0.mailbox.deliver(msg)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.0.uid == other.0.uid
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.uid.hash(state);
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("uid", &self.0.uid)
            .field("nick", &self.nick())
            .finish()
    }
}

/// Registry of nicknames.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find the user currently holding `nick` (case-insensitive).
    fn lookup(&self, nick: &str) -> Option<User>;

    /// Move `user` to `new_nick`. `Ok(false)` means the nick is taken.
    ///
    /// On success the directory has already told the user's channel peers.
    async fn change_nick(&self, user: &User, new_nick: &str) -> Result<bool, DirectoryError>;

    /// Claim the user's current nick at the end of registration.
    async fn register(&self, user: &User) -> Result<(), DirectoryError>;

    /// Forget `user` and announce `QUIT :reason` to its channel peers.
    fn unregister(&self, user: &User, reason: &str);

    /// Number of registered users, for the LUSER block.
    fn user_count(&self) -> usize;
}

/// A channel as seen by JOIN/PART/NAMES.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    fn topic(&self) -> Option<String>;

    /// Add `user`. Refusals come back as [`DirectoryError::Refused`].
    ///
    /// Other members are told about the join; the joining user is not.
    async fn join(&self, user: &User, key: &str) -> Result<(), DirectoryError>;

    /// Remove `user`. `Ok(false)` means it was not a member.
    async fn part(&self, user: &User) -> Result<bool, DirectoryError>;

    async fn members(&self) -> Result<Vec<User>, DirectoryError>;
}

/// Lookup of channels by name.
pub trait ChannelDirectory: Send + Sync {
    fn get_channel(&self, name: &str) -> Option<Arc<dyn Channel>>;
}
