//! Command handler registry and dispatch.
//!
//! Includes IRC-aware instrumentation: every dispatched command runs in an
//! `irc.command` span and is timed into the command metrics.

use std::collections::HashMap;

use tinyirc_proto::{Message, Numeric, irc_eq};
use tracing::debug;

use super::traits::Handler;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::channel::{JoinHandler, NamesHandler, PartHandler};
use crate::handlers::connection::{
    NickHandler, PingHandler, PongHandler, QuitHandler, UserHandler,
};
use crate::metrics;
use crate::state::Session;
use crate::telemetry::{CommandTimer, spans};

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        // Connection/registration handlers
        registry.register("NICK", Box::new(NickHandler));
        registry.register("USER", Box::new(UserHandler));
        registry.register("PING", Box::new(PingHandler));
        registry.register("PONG", Box::new(PongHandler));
        registry.register("QUIT", Box::new(QuitHandler));

        // Channel handlers
        registry.register("JOIN", Box::new(JoinHandler));
        registry.register("PART", Box::new(PartHandler));
        registry.register("NAMES", Box::new(NamesHandler));

        registry
    }

    /// A registry with no commands; everything is unknown.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Install `handler` for `verb` (uppercase), replacing any previous one.
    pub fn register(&mut self, verb: &'static str, handler: Box<dyn Handler>) {
        self.handlers.insert(verb, handler);
    }

    /// Dispatch a message to the appropriate handler.
    ///
    /// Recoverable failures are answered here. Only fatal errors are
    /// returned; the connection is expected to close on them.
    pub fn dispatch(&self, session: &mut Session, msg: &Message) -> HandlerResult {
        // Any inbound traffic proves liveness.
        session.ping_sent.clear();

        if let Some(prefix) = &msg.prefix {
            let own = session
                .nick_cell()
                .with(|nick| nick.is_some_and(|nick| irc_eq(nick, prefix.name())));
            if !own {
                debug!(uid = %session.uid, prefix = %prefix, "Prefix does not match nick, dropped");
                return Ok(());
            }
        }

        let cmd_name = msg.command.to_ascii_uppercase();
        let Some(handler) = self.handlers.get(cmd_name.as_str()) else {
            session.send_numeric(Numeric::err_unknowncommand(&msg.command));
            metrics::record_command_error(&cmd_name, "unknown_command");
            return Ok(());
        };

        let span = spans::command(&cmd_name, &session.uid);
        let _enter = span.enter();
        let _timer = CommandTimer::new(&cmd_name);

        let result = if handler.requires_registration() && !session.registered.is_set() {
            Err(HandlerError::NotRegistered)
        } else {
            handler.handle(session, msg)
        };
        settle(session, &cmd_name, result)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Answer a recoverable failure with its numeric, or pass a fatal one on.
pub fn settle(session: &mut Session, command: &str, result: HandlerResult) -> HandlerResult {
    let Err(err) = result else {
        return Ok(());
    };
    metrics::record_command_error(command, err.error_code());
    if err.is_fatal() {
        return Err(err);
    }
    if let HandlerError::Dropped { command, .. } = &err {
        metrics::record_dropped(command);
    }
    debug!(command, error = %err, "Command error");
    if let Some(reply) = err.to_reply(command) {
        session.send_numeric(reply);
    }
    Ok(())
}
