//! Test doubles and a session harness shared by unit tests.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tinyirc_proto::{Message, irc_eq};
use tokio::sync::{mpsc, oneshot};

use super::{
    Channel, ChannelDirectory, MAILBOX_CAPACITY, Mailbox, Matrix, NickCell, ServerInfo, Session,
    Task, User, UserDirectory,
};
use crate::error::{DirectoryError, HandlerResult};
use crate::handlers::{Registry, settle};

static NEXT_UID: AtomicU64 = AtomicU64::new(0);

pub fn test_matrix(
    users: Option<Arc<dyn UserDirectory>>,
    channels: Option<Arc<dyn ChannelDirectory>>,
) -> Arc<Matrix> {
    Arc::new(Matrix::with_directories(
        ServerInfo {
            name: "irc.test".into(),
            network: "TestNet".into(),
            motd: vec!["Hello".into()],
        },
        users,
        channels,
    ))
}

/// A session plus the receiving end of its mailbox.
pub struct Harness {
    pub session: Session,
    rx: mpsc::Receiver<Task>,
    registry: Registry,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_matrix(test_matrix(None, None))
    }

    pub fn with_matrix(matrix: Arc<Matrix>) -> Self {
        let (mailbox, rx) = Mailbox::new(MAILBOX_CAPACITY);
        let uid = format!("T{:08}", NEXT_UID.fetch_add(1, Ordering::Relaxed));
        let addr: SocketAddr = ([127, 0, 0, 1], 40000).into();
        let session = Session::new(uid, addr, "client.test".into(), matrix, mailbox);
        Self {
            session,
            rx,
            registry: Registry::new(),
        }
    }

    /// Parse and dispatch one client line.
    pub fn dispatch(&mut self, line: &str) -> HandlerResult {
        let msg = Message::parse(line).expect("test line parses");
        self.registry.dispatch(&mut self.session, &msg)
    }

    /// Flush the outbox as wire lines, targets bound now.
    pub fn lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(msg) = self.session.next_outbound() {
            lines.push(msg.to_line().expect("outbound message serializes"));
        }
        lines
    }

    pub fn pending_tasks(&self) -> usize {
        self.rx.len()
    }

    /// Run every task already queued.
    pub fn drain_tasks(&mut self) {
        while let Ok(task) = self.rx.try_recv() {
            self.run(task).expect("queued task succeeds");
        }
    }

    /// Wait for the next task and run it.
    pub async fn run_next_task(&mut self) {
        self.try_run_next_task().await.expect("queued task succeeds");
    }

    pub async fn try_run_next_task(&mut self) -> HandlerResult {
        let task = tokio::time::timeout(Duration::from_secs(2), self.rx.recv())
            .await
            .expect("a task arrives")
            .expect("mailbox open");
        self.run(task)
    }

    /// Run tasks until none arrive for a short while.
    pub async fn settle(&mut self) {
        while let Ok(Some(task)) =
            tokio::time::timeout(Duration::from_millis(50), self.rx.recv()).await
        {
            self.run(task).expect("queued task succeeds");
        }
    }

    fn run(&mut self, task: Task) -> HandlerResult {
        let result = task(&mut self.session);
        settle(&mut self.session, "*", result)
    }
}

/// A registered user handle backed by its own harness.
pub fn make_user(nick: &str) -> (User, Harness) {
    let mut harness = Harness::new();
    harness.session.set_nick(Some(nick.to_owned()));
    harness.session.username = Some(nick.to_owned());
    harness.session.registered.set();
    let user = User::new(
        harness.session.uid.clone(),
        harness.session.nick_cell().clone(),
        nick.to_owned(),
        "Test User".into(),
        "client.test".into(),
        harness.session.mailbox().clone(),
    );
    harness.session.user = Some(user.clone());
    (user, harness)
}

fn detached_user(nick: &str) -> User {
    let (mailbox, _rx) = Mailbox::new(1);
    let cell = NickCell::new();
    cell.replace(Some(nick.to_owned()));
    User::new(
        format!("X{nick}"),
        cell,
        nick.to_owned(),
        String::new(),
        "elsewhere.test".into(),
        mailbox,
    )
}

/// User directory whose answers are set by the test.
#[derive(Default)]
pub struct ScriptedUsers {
    /// Nicks `lookup` reports as held by someone.
    pub taken: Mutex<Vec<String>>,
    /// Next `change_nick` answer; `Ok(true)` when unset.
    pub nick_change: Mutex<Option<Result<bool, DirectoryError>>>,
    /// Next `register` failure.
    pub register_error: Mutex<Option<DirectoryError>>,
    /// When set, `register` waits for this before answering.
    pub register_gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub registered: Mutex<Vec<String>>,
    pub unregistered: Mutex<Vec<(String, String)>>,
}

impl ScriptedUsers {
    pub fn taking(nicks: &[&str]) -> Self {
        let users = Self::default();
        *users.taken.lock() = nicks.iter().map(|n| n.to_string()).collect();
        users
    }
}

#[async_trait]
impl UserDirectory for ScriptedUsers {
    fn lookup(&self, nick: &str) -> Option<User> {
        let taken = self.taken.lock().iter().any(|t| irc_eq(t, nick));
        taken.then(|| detached_user(nick))
    }

    async fn change_nick(&self, _user: &User, _new_nick: &str) -> Result<bool, DirectoryError> {
        let scripted = self.nick_change.lock().take();
        scripted.unwrap_or(Ok(true))
    }

    async fn register(&self, user: &User) -> Result<(), DirectoryError> {
        let gate = self.register_gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.register_error.lock().take() {
            return Err(err);
        }
        self.registered.lock().push(user.nick());
        Ok(())
    }

    fn unregister(&self, user: &User, reason: &str) {
        self.unregistered
            .lock()
            .push((user.nick(), reason.to_owned()));
    }

    fn user_count(&self) -> usize {
        self.registered.lock().len()
    }
}

/// A channel whose JOIN/PART answers are set by the test.
pub struct ScriptedChannel {
    pub name: String,
    pub topic: Option<String>,
    /// Scripted JOIN answers, consumed in order; a plain join otherwise.
    pub join_results: Mutex<VecDeque<Result<(), DirectoryError>>>,
    pub part_error: Mutex<Option<DirectoryError>>,
    pub keys: Mutex<Vec<String>>,
    pub members: Mutex<Vec<User>>,
    /// When set, `members` waits for this before answering.
    pub members_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl ScriptedChannel {
    pub fn new(name: &str, topic: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            topic: topic.map(str::to_owned),
            join_results: Mutex::new(VecDeque::new()),
            part_error: Mutex::new(None),
            keys: Mutex::new(Vec::new()),
            members: Mutex::new(Vec::new()),
            members_gate: Mutex::new(None),
        })
    }
}

#[async_trait]
impl Channel for ScriptedChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn topic(&self) -> Option<String> {
        self.topic.clone()
    }

    async fn join(&self, user: &User, key: &str) -> Result<(), DirectoryError> {
        self.keys.lock().push(key.to_owned());
        let scripted = self.join_results.lock().pop_front();
        match scripted {
            Some(Err(e)) => Err(e),
            _ => {
                self.members.lock().push(user.clone());
                Ok(())
            }
        }
    }

    async fn part(&self, user: &User) -> Result<bool, DirectoryError> {
        if let Some(err) = self.part_error.lock().take() {
            return Err(err);
        }
        let mut members = self.members.lock();
        let before = members.len();
        members.retain(|m| m != user);
        Ok(members.len() != before)
    }

    async fn members(&self) -> Result<Vec<User>, DirectoryError> {
        let gate = self.members_gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(self.members.lock().clone())
    }
}

#[derive(Default)]
pub struct ScriptedChannels {
    pub channels: Vec<Arc<ScriptedChannel>>,
}

impl ChannelDirectory for ScriptedChannels {
    fn get_channel(&self, name: &str) -> Option<Arc<dyn Channel>> {
        self.channels
            .iter()
            .find(|c| irc_eq(&c.name, name))
            .map(|c| Arc::clone(c) as Arc<dyn Channel>)
    }
}

/// A harness that has completed NICK/USER against `matrix`.
pub fn registered(matrix: Arc<Matrix>, nick: &str) -> Harness {
    let mut harness = Harness::with_matrix(matrix);
    harness.dispatch(&format!("NICK {nick}")).unwrap();
    harness
        .dispatch(&format!("USER {nick} 0 * :Test User"))
        .unwrap();
    harness.drain_tasks();
    assert!(harness.session.registered.is_set(), "registration completed");
    harness.lines();
    harness
}
