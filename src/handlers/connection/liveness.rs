//! Idle detection and the quit protocol.
//!
//! Three triggers end a session: QUIT, a second idle period without any
//! inbound traffic, and the peer closing the socket. They all funnel into
//! [`quit`], whose latch lets exactly one of them announce the departure.

use tinyirc_proto::Message;
use tracing::{debug, info};

use crate::metrics;
use crate::state::Session;

/// Reason given when the client never answered our PING.
pub const PING_TIMEOUT_REASON: &str = "Ping timeout";

/// Called by the connection when the idle window elapses.
///
/// The first idle period sends `PING <server>`. If it elapses again before
/// any inbound line, the session is quit with "Ping timeout" and closed.
pub fn on_idle(session: &mut Session) {
    if session.ping_sent.set() {
        debug!(uid = %session.uid, "Idle, sending PING");
        let ping = Message::ping(session.server_name()).with_prefix(session.server_prefix());
        session.send(ping);
        return;
    }

    info!(uid = %session.uid, "Ping timeout");
    metrics::inc_counter(&metrics::PING_TIMEOUTS);
    quit(session, PING_TIMEOUT_REASON);
    session.close(PING_TIMEOUT_REASON);
}

/// Reason peers see when the socket closed without a QUIT.
pub const DISCONNECT_REASON: &str = "Connection closed by peer";

/// Called by the connection after the peer went away.
pub fn on_disconnect(session: &mut Session) {
    quit(session, DISCONNECT_REASON);
}

/// Mark the session quit. Returns `true` for the one caller that did.
///
/// A registered client gets its own `QUIT` echoed back, and is removed from
/// the user directory, which announces `QUIT :reason` to its channel peers.
pub fn quit(session: &mut Session, reason: &str) -> bool {
    if !session.quitted.set() {
        return false;
    }

    if session.registered.is_set() {
        let echo = Message::new("QUIT", vec![reason.to_owned()]).with_prefix(session.hostmask());
        session.send(echo);
        if let (Some(users), Some(user)) = (&session.matrix.users, &session.user) {
            users.unregister(user, reason);
        }
    }
    info!(uid = %session.uid, nick = ?session.nick(), reason = %reason, "Client quit");
    true
}
