//! USER command handler.

use tinyirc_proto::{Message, Numeric};

use super::welcome::{is_registering, try_register};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::Handler;
use crate::state::Session;

/// Handler for `USER <username> <mode> <unused> <realname>`.
pub struct UserHandler;

impl Handler for UserHandler {
    fn handle(&self, session: &mut Session, msg: &Message) -> HandlerResult {
        if msg.params.len() != 4 {
            return Err(HandlerError::NeedMoreParams);
        }

        if session.registered.is_set() || is_registering(session) {
            session.send_numeric(Numeric::err_alreadyregistered());
            return Ok(());
        }

        let registration = session.registration_mut();
        registration.username = Some(msg.params[0].clone());
        registration.realname = Some(msg.params[3].clone());

        try_register(session, "USER")
    }
}
