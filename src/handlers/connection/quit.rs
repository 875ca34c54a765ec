//! QUIT command handler.

use tinyirc_proto::Message;

use super::liveness::quit;
use crate::error::HandlerResult;
use crate::handlers::Handler;
use crate::state::Session;

/// Handler for `QUIT [<reason>]`. Without a reason the nick is used.
pub struct QuitHandler;

impl Handler for QuitHandler {
    fn handle(&self, session: &mut Session, msg: &Message) -> HandlerResult {
        let reason = match msg.param(0) {
            Some(reason) => reason.to_owned(),
            None => session.nick().unwrap_or_else(|| "Client Quit".to_owned()),
        };
        quit(session, &reason);
        session.close(&reason);
        Ok(())
    }
}
