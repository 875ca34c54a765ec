//! In-memory channel directory.
//!
//! Every channel is an actor task that owns its member list and answers
//! requests over an `mpsc` queue with `oneshot` replies. Channels named in
//! the configuration are permanent; all others are created on first lookup
//! and removed when their last member leaves.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use dashmap::DashMap;
use tinyirc_proto::casemap::matches_mask;
use tinyirc_proto::{ChannelExt, Message, irc_to_lower};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::config::{ChannelBlock, LimitsConfig};
use crate::error::{DirectoryError, DroppedCommand, JoinRefusal};
use crate::metrics;
use crate::state::directory::{Channel, ChannelDirectory, User};
use crate::state::uid::Uid;

/// Requests handled by a channel actor.
#[derive(Debug)]
enum ChannelEvent {
    Join {
        user: User,
        key: String,
        reply_tx: oneshot::Sender<Result<(), DirectoryError>>,
    },
    Part {
        user: User,
        reply_tx: oneshot::Sender<bool>,
    },
    /// Drop a departed user without telling anyone.
    Quit { uid: Uid },
    GetMembers {
        reply_tx: oneshot::Sender<im::Vector<User>>,
    },
}

/// Entry restrictions of a channel.
#[derive(Debug, Clone, Default)]
struct ChannelModes {
    key: Option<String>,
    limit: Option<usize>,
    invite_only: bool,
    invite_masks: Vec<String>,
    ban_masks: Vec<String>,
}

impl From<&ChannelBlock> for ChannelModes {
    fn from(block: &ChannelBlock) -> Self {
        Self {
            key: block.key.clone(),
            limit: block.limit,
            invite_only: block.invite_only,
            invite_masks: block.invite_masks.clone(),
            ban_masks: block.ban_masks.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActorState {
    Active,
    /// Last member left; the channel is no longer reachable by name.
    Draining,
}

struct Shared {
    channels: DashMap<String, Arc<MemoryChannel>>,
    /// Lowercased names of the channels each user is in.
    joined: DashMap<Uid, HashSet<String>>,
    max_per_user: usize,
    mailbox_capacity: usize,
    next_id: AtomicU64,
}

/// Channel directory backed by per-channel actor tasks.
#[derive(Clone)]
pub struct MemoryChannels {
    shared: Arc<Shared>,
}

impl MemoryChannels {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                channels: DashMap::new(),
                joined: DashMap::new(),
                max_per_user: limits.max_channels_per_user,
                mailbox_capacity: limits.channel_mailbox_capacity.max(1),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Create a permanent channel from its configuration block.
    pub fn declare(&self, block: &ChannelBlock) {
        let lowered = irc_to_lower(&block.name);
        let channel = spawn_channel(
            &self.shared,
            block.name.clone(),
            block.topic.clone(),
            ChannelModes::from(block),
            true,
        );
        self.shared.channels.insert(lowered, channel);
    }

    pub fn channel_count(&self) -> usize {
        self.shared.channels.len()
    }

    /// Names of the channels `uid` is currently in (lowercased).
    pub fn channels_of(&self, uid: &str) -> Vec<String> {
        self.shared
            .joined
            .get(uid)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Everyone sharing at least one channel with `user`, each listed once.
    pub async fn peers(&self, user: &User) -> Vec<User> {
        let mut seen = HashSet::new();
        let mut peers = Vec::new();
        for name in self.channels_of(user.uid()) {
            let Some(channel) = self.shared.channels.get(&name).map(|c| Arc::clone(c.value()))
            else {
                continue;
            };
            let Ok(members) = channel.members().await else {
                continue;
            };
            for member in members {
                if member != *user && seen.insert(member.uid().to_owned()) {
                    peers.push(member);
                }
            }
        }
        peers
    }

    /// Remove `user` from every channel it is in, silently.
    pub async fn forget(&self, user: &User) {
        let Some((_, names)) = self.shared.joined.remove(user.uid()) else {
            return;
        };
        for name in names {
            let channel = self.shared.channels.get(&name).map(|c| Arc::clone(c.value()));
            if let Some(channel) = channel {
                let _ = channel
                    .tx
                    .send(ChannelEvent::Quit {
                        uid: user.uid().to_owned(),
                    })
                    .await;
            }
        }
    }
}

impl ChannelDirectory for MemoryChannels {
    fn get_channel(&self, name: &str) -> Option<Arc<dyn Channel>> {
        if !name.is_channel_name() {
            return None;
        }
        let channel = self
            .shared
            .channels
            .entry(irc_to_lower(name))
            .or_insert_with(|| {
                spawn_channel(
                    &self.shared,
                    name.to_owned(),
                    None,
                    ChannelModes::default(),
                    false,
                )
            })
            .clone();
        Some(channel)
    }
}

fn spawn_channel(
    shared: &Arc<Shared>,
    name: String,
    topic: Option<String>,
    modes: ChannelModes,
    permanent: bool,
) -> Arc<MemoryChannel> {
    let (tx, rx) = mpsc::channel(shared.mailbox_capacity);
    let id = shared.next_id.fetch_add(1, Ordering::Relaxed);

    let actor = ChannelActor {
        id,
        lowered: irc_to_lower(&name),
        name: name.clone(),
        modes,
        permanent,
        members: im::Vector::new(),
        shared: Arc::downgrade(shared),
        state: ActorState::Active,
    };
    tokio::spawn(actor.run(rx));
    metrics::add_gauge(&metrics::ACTIVE_CHANNELS, 1);

    Arc::new(MemoryChannel {
        id,
        name,
        topic,
        tx,
    })
}

/// Handle on a channel actor.
pub struct MemoryChannel {
    id: u64,
    name: String,
    topic: Option<String>,
    tx: mpsc::Sender<ChannelEvent>,
}

impl MemoryChannel {
    async fn request<T>(
        &self,
        event: ChannelEvent,
        reply: oneshot::Receiver<T>,
    ) -> Result<T, DirectoryError> {
        // A closed queue or dropped reply means the actor drained away.
        self.tx
            .send(event)
            .await
            .map_err(|_| DroppedCommand::default())?;
        reply.await.map_err(|_| DroppedCommand::default().into())
    }
}

#[async_trait]
impl Channel for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn topic(&self) -> Option<String> {
        self.topic.clone()
    }

    async fn join(&self, user: &User, key: &str) -> Result<(), DirectoryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let event = ChannelEvent::Join {
            user: user.clone(),
            key: key.to_owned(),
            reply_tx,
        };
        self.request(event, reply_rx).await?
    }

    async fn part(&self, user: &User) -> Result<bool, DirectoryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let event = ChannelEvent::Part {
            user: user.clone(),
            reply_tx,
        };
        self.request(event, reply_rx).await
    }

    async fn members(&self) -> Result<Vec<User>, DirectoryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let members = self
            .request(ChannelEvent::GetMembers { reply_tx }, reply_rx)
            .await?;
        Ok(members.into_iter().collect())
    }
}

struct ChannelActor {
    id: u64,
    name: String,
    lowered: String,
    modes: ChannelModes,
    permanent: bool,
    members: im::Vector<User>,
    shared: Weak<Shared>,
    state: ActorState,
}

impl ChannelActor {
    async fn run(mut self, mut rx: mpsc::Receiver<ChannelEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle_event(event);
            if self.state == ActorState::Draining {
                break;
            }
        }
        debug!(channel = %self.name, "channel actor stopped");
    }

    fn handle_event(&mut self, event: ChannelEvent) {
        // Drain before replying so a caller never sees an empty channel
        // still listed.
        match event {
            ChannelEvent::Join {
                user,
                key,
                reply_tx,
            } => {
                let result = self.handle_join(user, &key);
                self.maybe_drain();
                let _ = reply_tx.send(result);
            }
            ChannelEvent::Part { user, reply_tx } => {
                let removed = self.handle_part(&user);
                self.maybe_drain();
                let _ = reply_tx.send(removed);
            }
            ChannelEvent::Quit { uid } => {
                self.remove_member(&uid);
                self.maybe_drain();
            }
            ChannelEvent::GetMembers { reply_tx } => {
                let members = self.members.clone();
                self.maybe_drain();
                let _ = reply_tx.send(members);
            }
        }
    }

    fn handle_join(&mut self, user: User, key: &str) -> Result<(), DirectoryError> {
        if self.members.contains(&user) {
            return Err(DroppedCommand::silent().into());
        }
        if let Some(reason) = self.check_entry(&user, key) {
            return Err(DirectoryError::Refused(reason));
        }

        let Some(shared) = self.shared.upgrade() else {
            return Err(DroppedCommand::default().into());
        };
        {
            let mut joined = shared.joined.entry(user.uid().to_owned()).or_default();
            if joined.len() >= shared.max_per_user {
                return Err(DirectoryError::Refused(JoinRefusal::TooManyChannels));
            }
            joined.insert(self.lowered.clone());
        }

        let join = Message::new("JOIN", vec![self.name.clone()]).with_prefix(user.hostmask());
        for member in self.members.iter() {
            member.deliver(join.clone());
        }
        self.members.push_back(user);
        Ok(())
    }

    /// First failing restriction, in ban / invite / key / limit order.
    fn check_entry(&self, user: &User, key: &str) -> Option<JoinRefusal> {
        let mask = user.hostmask().to_string();
        let modes = &self.modes;

        if modes.ban_masks.iter().any(|m| matches_mask(m, &mask)) {
            return Some(JoinRefusal::Banned);
        }
        if modes.invite_only && !modes.invite_masks.iter().any(|m| matches_mask(m, &mask)) {
            return Some(JoinRefusal::NeedInvite);
        }
        if modes.key.as_deref().is_some_and(|k| k != key) {
            return Some(JoinRefusal::WrongPassword);
        }
        if modes.limit.is_some_and(|limit| self.members.len() >= limit) {
            return Some(JoinRefusal::ChannelFull);
        }
        None
    }

    fn handle_part(&mut self, user: &User) -> bool {
        if !self.remove_member(user.uid()) {
            return false;
        }
        let part = Message::new("PART", vec![self.name.clone()]).with_prefix(user.hostmask());
        for member in self.members.iter() {
            member.deliver(part.clone());
        }
        true
    }

    fn remove_member(&mut self, uid: &str) -> bool {
        let Some(index) = self.members.iter().position(|m| m.uid() == uid) else {
            return false;
        };
        self.members.remove(index);
        if let Some(shared) = self.shared.upgrade()
            && let Some(mut joined) = shared.joined.get_mut(uid)
        {
            joined.remove(&self.lowered);
        }
        true
    }

    fn maybe_drain(&mut self) {
        if self.permanent || !self.members.is_empty() || self.state != ActorState::Active {
            return;
        }
        self.state = ActorState::Draining;
        if let Some(shared) = self.shared.upgrade() {
            shared
                .channels
                .remove_if(&self.lowered, |_, channel| channel.id == self.id);
        }
        metrics::add_gauge(&metrics::ACTIVE_CHANNELS, -1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::make_user;

    fn limits(max_per_user: usize) -> LimitsConfig {
        LimitsConfig {
            max_channels_per_user: max_per_user,
            ..LimitsConfig::default()
        }
    }

    fn block(name: &str) -> ChannelBlock {
        ChannelBlock {
            name: name.to_owned(),
            topic: Some("Permanent".into()),
            key: None,
            limit: None,
            invite_only: false,
            invite_masks: Vec::new(),
            ban_masks: Vec::new(),
        }
    }

    async fn refusal(channel: &Arc<dyn Channel>, user: &User, key: &str) -> Option<JoinRefusal> {
        match channel.join(user, key).await {
            Err(DirectoryError::Refused(reason)) => Some(reason),
            _ => None,
        }
    }

    #[tokio::test]
    async fn invalid_names_have_no_channel() {
        let channels = MemoryChannels::new(&limits(5));
        assert!(channels.get_channel("nochan").is_none());
        assert!(channels.get_channel("#a,b").is_none());
        assert!(channels.get_channel("#ok").is_some());
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let channels = MemoryChannels::new(&limits(5));
        let a = channels.get_channel("#Rust").unwrap();
        let (alice, _h) = make_user("alice");
        a.join(&alice, "").await.unwrap();
        let b = channels.get_channel("#rust").unwrap();
        assert_eq!(b.name(), "#Rust");
        assert_eq!(b.members().await.unwrap(), vec![alice]);
    }

    #[tokio::test]
    async fn join_notifies_existing_members_only() {
        let channels = MemoryChannels::new(&limits(5));
        let chan = channels.get_channel("#rust").unwrap();
        let (alice, mut alice_h) = make_user("alice");
        let (bob, mut bob_h) = make_user("bob");

        chan.join(&alice, "").await.unwrap();
        chan.join(&bob, "").await.unwrap();

        alice_h.drain_tasks();
        bob_h.drain_tasks();
        assert_eq!(alice_h.lines(), vec![":bob!~bob@client.test JOIN #rust"]);
        assert!(bob_h.lines().is_empty());
    }

    #[tokio::test]
    async fn refusals_follow_modes() {
        let channels = MemoryChannels::new(&limits(5));
        let (alice, _a) = make_user("alice");
        let (bob, _b) = make_user("bob");

        let mut banned = block("#banned");
        banned.ban_masks = vec!["alice!*@*".into()];
        let mut invite = block("#invite");
        invite.invite_only = true;
        invite.invite_masks = vec!["bob!*@*".into()];
        let mut keyed = block("#keyed");
        keyed.key = Some("sesame".into());
        let mut full = block("#full");
        full.limit = Some(1);
        for b in [&banned, &invite, &keyed, &full] {
            channels.declare(b);
        }

        let get = |name: &str| channels.get_channel(name).unwrap();
        assert_eq!(refusal(&get("#banned"), &alice, "").await, Some(JoinRefusal::Banned));
        assert_eq!(refusal(&get("#invite"), &alice, "").await, Some(JoinRefusal::NeedInvite));
        assert_eq!(refusal(&get("#invite"), &bob, "").await, None);
        assert_eq!(refusal(&get("#keyed"), &alice, "").await, Some(JoinRefusal::WrongPassword));
        assert_eq!(refusal(&get("#keyed"), &alice, "sesame").await, None);
        assert_eq!(refusal(&get("#full"), &alice, "").await, None);
        assert_eq!(refusal(&get("#full"), &bob, "").await, Some(JoinRefusal::ChannelFull));

        // Refused users are not members.
        assert_eq!(get("#banned").members().await.unwrap(), Vec::<User>::new());
    }

    #[tokio::test]
    async fn per_user_channel_limit() {
        let channels = MemoryChannels::new(&limits(2));
        let (alice, _a) = make_user("alice");
        for name in ["#one", "#two"] {
            channels.get_channel(name).unwrap().join(&alice, "").await.unwrap();
        }
        let third = channels.get_channel("#three").unwrap();
        assert_eq!(refusal(&third, &alice, "").await, Some(JoinRefusal::TooManyChannels));

        // Leaving one frees a slot. The refused join left #three empty, so
        // it was drained and has to be looked up again.
        assert!(channels.get_channel("#one").unwrap().part(&alice).await.unwrap());
        let third = channels.get_channel("#three").unwrap();
        assert!(third.join(&alice, "").await.is_ok());
    }

    #[tokio::test]
    async fn part_reports_membership() {
        let channels = MemoryChannels::new(&limits(5));
        channels.declare(&block("#perm"));
        let chan = channels.get_channel("#perm").unwrap();
        let (alice, _a) = make_user("alice");

        assert!(!chan.part(&alice).await.unwrap());
        chan.join(&alice, "").await.unwrap();
        assert!(chan.part(&alice).await.unwrap());
        assert_eq!(chan.topic().as_deref(), Some("Permanent"));
    }

    #[tokio::test]
    async fn empty_temporary_channel_is_removed() {
        let channels = MemoryChannels::new(&limits(5));
        let chan = channels.get_channel("#tmp").unwrap();
        let (alice, _a) = make_user("alice");
        chan.join(&alice, "").await.unwrap();
        assert_eq!(channels.channel_count(), 1);

        assert!(chan.part(&alice).await.unwrap());
        assert_eq!(channels.channel_count(), 0);

        // The stale handle now asks the caller to retry.
        assert!(matches!(
            chan.join(&alice, "").await,
            Err(DirectoryError::Dropped(_))
        ));
    }

    #[tokio::test]
    async fn rejoin_is_silently_dropped() {
        let channels = MemoryChannels::new(&limits(5));
        let chan = channels.get_channel("#rust").unwrap();
        let (alice, _a) = make_user("alice");
        chan.join(&alice, "").await.unwrap();
        match chan.join(&alice, "").await {
            Err(DirectoryError::Dropped(cause)) => assert!(cause.silent),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn peers_are_deduplicated_and_forget_clears_membership() {
        let channels = MemoryChannels::new(&limits(5));
        let (alice, _a) = make_user("alice");
        let (bob, _b) = make_user("bob");
        for name in ["#one", "#two"] {
            let chan = channels.get_channel(name).unwrap();
            chan.join(&alice, "").await.unwrap();
            chan.join(&bob, "").await.unwrap();
        }

        assert_eq!(channels.peers(&alice).await, vec![bob.clone()]);

        channels.forget(&alice).await;
        assert!(channels.channels_of(alice.uid()).is_empty());
        let members = channels.get_channel("#one").unwrap().members().await.unwrap();
        assert_eq!(members, vec![bob]);
    }
}
