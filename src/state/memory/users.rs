//! In-memory user directory.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tinyirc_proto::{Message, irc_to_lower};
use tracing::debug;

use super::channels::MemoryChannels;
use crate::error::{DirectoryError, DroppedCommand};
use crate::metrics;
use crate::state::Uid;
use crate::state::directory::{User, UserDirectory};

/// Nick registry keyed by RFC 1459 case-folded nick.
///
/// Channel membership is delegated to [`MemoryChannels`], which is also
/// used to find who must hear about NICK and QUIT.
pub struct MemoryUsers {
    nicks: DashMap<String, User>,
    /// Nick each user holds here, by uid. Runs ahead of the session's nick
    /// cell while a change is waiting to be adopted.
    claimed: DashMap<Uid, String>,
    channels: MemoryChannels,
}

impl MemoryUsers {
    pub fn new(channels: MemoryChannels) -> Self {
        Self {
            nicks: DashMap::new(),
            claimed: DashMap::new(),
            channels,
        }
    }

    fn claimed_nick(&self, user: &User) -> String {
        self.claimed
            .get(user.uid())
            .map(|nick| nick.value().clone())
            .unwrap_or_else(|| user.nick())
    }
}

#[async_trait]
impl UserDirectory for MemoryUsers {
    fn lookup(&self, nick: &str) -> Option<User> {
        self.nicks.get(&irc_to_lower(nick)).map(|u| u.value().clone())
    }

    async fn change_nick(&self, user: &User, new_nick: &str) -> Result<bool, DirectoryError> {
        let old_nick = self.claimed_nick(user);
        let old_key = irc_to_lower(&old_nick);
        let new_key = irc_to_lower(new_nick);

        match self.nicks.entry(new_key.clone()) {
            Entry::Occupied(entry) if entry.get() != user => return Ok(false),
            Entry::Occupied(_) => {}
            Entry::Vacant(entry) => {
                entry.insert(user.clone());
            }
        }
        if old_key != new_key {
            self.nicks.remove_if(&old_key, |_, holder| holder == user);
        }
        self.claimed.insert(user.uid().to_owned(), new_nick.to_owned());

        let msg = Message::new("NICK", vec![new_nick.to_owned()])
            .with_prefix(user.hostmask_as(old_nick));
        for peer in self.channels.peers(user).await {
            peer.deliver(msg.clone());
        }
        Ok(true)
    }

    async fn register(&self, user: &User) -> Result<(), DirectoryError> {
        let nick = user.nick();
        match self.nicks.entry(irc_to_lower(&nick)) {
            Entry::Occupied(entry) if entry.get() != user => {
                Err(DroppedCommand::with_reason("Nickname is already in use.").into())
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(user.clone());
                self.claimed.insert(user.uid().to_owned(), nick);
                metrics::add_gauge(&metrics::REGISTERED_USERS, 1);
                Ok(())
            }
        }
    }

    fn unregister(&self, user: &User, reason: &str) {
        let nick = match self.claimed.remove(user.uid()) {
            Some((_, nick)) => nick,
            None => user.nick(),
        };
        let key = irc_to_lower(&nick);
        if self.nicks.remove_if(&key, |_, holder| holder == user).is_none() {
            debug!(uid = %user.uid(), "unregister of unknown user");
            return;
        }
        metrics::add_gauge(&metrics::REGISTERED_USERS, -1);

        let quit =
            Message::new("QUIT", vec![reason.to_owned()]).with_prefix(user.hostmask_as(nick));
        let channels = self.channels.clone();
        let user = user.clone();
        tokio::spawn(async move {
            for peer in channels.peers(&user).await {
                peer.deliver(quit.clone());
            }
            channels.forget(&user).await;
        });
    }

    fn user_count(&self) -> usize {
        self.nicks.len()
    }
}
