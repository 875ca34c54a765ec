//! PART command handler.

use std::sync::Arc;

use tinyirc_proto::{Message, Numeric};

use super::{find_channel, split_targets};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Handler, settle};
use crate::state::{Channel, Session, User};

/// Handler for `PART <channel>{,<channel>}`.
pub struct PartHandler;

impl Handler for PartHandler {
    fn handle(&self, session: &mut Session, msg: &Message) -> HandlerResult {
        let targets = msg.param(0).ok_or(HandlerError::NeedMoreParams)?;
        let user = session
            .user
            .clone()
            .ok_or_else(|| HandlerError::Internal("registered session without user".into()))?;

        for name in split_targets(targets) {
            let Some(channel) = find_channel(session, name) else {
                session.send_numeric(Numeric::err_nosuchchannel(name));
                continue;
            };
            let result = part_channel(session, channel, user.clone());
            settle(session, "PART", result)?;
        }
        Ok(())
    }

    fn requires_registration(&self) -> bool {
        true
    }
}

fn part_channel(session: &mut Session, channel: Arc<dyn Channel>, user: User) -> HandlerResult {
    let target = Arc::clone(&channel);
    session.enqueue(
        async move { target.part(&user).await },
        move |session, result| match result {
            Ok(true) => {
                let part =
                    Message::new("PART", vec![channel.name().to_owned()]).with_prefix(session.hostmask());
                session.send(part);
                Ok(())
            }
            Ok(false) => {
                session.send_numeric(Numeric::err_notonchannel(channel.name()));
                Ok(())
            }
            Err(e) => Err(HandlerError::from_directory("PART", e)),
        },
    )
}
