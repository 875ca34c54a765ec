//! Registration completion and the welcome burst.

use std::sync::Arc;

use tinyirc_proto::Numeric;
use tracing::{debug, info};

use crate::error::{HandlerError, HandlerResult};
use crate::state::{Session, User};

/// Complete registration if both NICK and USER have arrived.
///
/// The staged [`RegistrationData`](crate::state::RegistrationData) is taken
/// off the session here, so only one caller ever gets past this point for a
/// given NICK/USER pair. `command` names the command that completed it and
/// tags any RPL_TRYAGAIN.
pub fn try_register(session: &mut Session, command: &'static str) -> HandlerResult {
    let Some(data) = session.registration.take_if(|data| data.is_complete()) else {
        return Ok(());
    };
    let (Some(nick), Some(username)) = (data.nick, data.username) else {
        return Err(HandlerError::Internal("incomplete registration data".into()));
    };

    session.set_nick(Some(nick));
    session.username = Some(username.clone());
    session.realname = data.realname.clone();

    let user = User::new(
        session.uid.clone(),
        session.nick_cell().clone(),
        username,
        data.realname.unwrap_or_default(),
        session.hostname.clone(),
        session.mailbox().clone(),
    );
    session.user = Some(user.clone());

    let Some(users) = session.matrix.users.clone() else {
        return send_welcome(session);
    };
    session.enqueue(
        async move { users.register(&user).await },
        move |session, result| match result {
            Ok(()) => send_welcome(session),
            Err(e) => {
                debug!(uid = %session.uid, error = %e, "Registration refused by directory");
                session.set_nick(None);
                session.username = None;
                session.realname = None;
                session.user = None;
                Err(HandlerError::from_directory(command, e))
            }
        },
    )
}

/// True while the directory is still deciding on a registration.
pub fn is_registering(session: &Session) -> bool {
    session.user.is_some() && !session.registered.is_set()
}

/// 001, the LUSER block and the MOTD, sent once per connection.
fn send_welcome(session: &mut Session) -> HandlerResult {
    if !session.registered.set() {
        return Ok(());
    }
    let matrix = Arc::clone(&session.matrix);
    let nick = session.nick().unwrap_or_default();

    session.send_numeric(Numeric::rpl_welcome(&matrix.server.network, &nick));

    let users = matrix.user_count();
    session.send_numeric(Numeric::rpl_luserclient(users, 0, 1));
    session.send_numeric(Numeric::rpl_luserme(users, 0));

    session.send_numeric(Numeric::rpl_motdstart(&matrix.server.name));
    for line in &matrix.server.motd {
        session.send_numeric(Numeric::rpl_motd(line));
    }
    session.send_numeric(Numeric::rpl_endofmotd());

    info!(
        uid = %session.uid,
        nick = %nick,
        host = %session.hostname,
        "Client registered"
    );
    Ok(())
}
