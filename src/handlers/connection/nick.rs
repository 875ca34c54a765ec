//! NICK command handler.

use tinyirc_proto::{Message, NickExt, Numeric};
use tracing::{debug, info};

use super::welcome::{is_registering, try_register};
use crate::error::{DroppedCommand, HandlerError, HandlerResult};
use crate::handlers::Handler;
use crate::state::Session;

/// Handler for NICK command.
///
/// A nick held by anyone in the user directory, this session included, is
/// answered with ERR_NICKNAMEINUSE both before and after registration. A
/// second change while the directory is still deciding on the first is
/// dropped with RPL_TRYAGAIN.
pub struct NickHandler;

impl Handler for NickHandler {
    fn handle(&self, session: &mut Session, msg: &Message) -> HandlerResult {
        let Some(nick) = msg.param(0).filter(|nick| !nick.is_empty()) else {
            session.send_numeric(Numeric::err_nonicknamegiven());
            return Ok(());
        };

        if !nick.is_valid_nick() {
            session.send_numeric(Numeric::err_erroneousnickname(nick));
            return Ok(());
        }

        if let Some(users) = &session.matrix.users
            && users.lookup(nick).is_some()
        {
            session.send_numeric(Numeric::err_nicknameinuse(nick));
            return Ok(());
        }

        if session.registered.is_set() {
            if session.changing_nick {
                return Err(HandlerError::Dropped {
                    command: "NICK",
                    cause: DroppedCommand::with_reason("Nick change in progress."),
                });
            }
            return change_nick(session, nick);
        }
        if is_registering(session) {
            return Err(HandlerError::Dropped {
                command: "NICK",
                cause: DroppedCommand::with_reason("Registration in progress."),
            });
        }

        session.registration_mut().nick = Some(nick.to_owned());
        debug!(uid = %session.uid, nick = %nick, "Nick staged");
        try_register(session, "NICK")
    }
}

/// Ask the directory to move a registered user to `nick`.
fn change_nick(session: &mut Session, nick: &str) -> HandlerResult {
    let wanted = nick.to_owned();

    let (Some(users), Some(user)) = (session.matrix.users.clone(), session.user.clone()) else {
        adopt_nick(session, wanted);
        return Ok(());
    };

    let requested = wanted.clone();
    session.changing_nick = true;
    session.enqueue(
        async move { users.change_nick(&user, &requested).await },
        move |session, result| {
            session.changing_nick = false;
            match result {
                Ok(true) => {
                    adopt_nick(session, wanted);
                    Ok(())
                }
                Ok(false) => {
                    session.send_numeric(Numeric::err_nicknameinuse(&wanted));
                    Ok(())
                }
                Err(e) => Err(HandlerError::from_directory("NICK", e)),
            }
        },
    )
}

/// Echo `:old!user@host NICK new` to the client and switch the nick cell.
fn adopt_nick(session: &mut Session, nick: String) {
    let change = Message::new("NICK", vec![nick.clone()]).with_prefix(session.hostmask());
    session.send(change);
    let old = session.set_nick(Some(nick.clone()));
    info!(uid = %session.uid, old = ?old, new = %nick, "Nick changed");
}
