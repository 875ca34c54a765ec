//! JOIN command handler.

use std::sync::Arc;

use tinyirc_proto::{Message, Numeric};
use tracing::{debug, warn};

use super::{find_channel, send_names};
use crate::error::{DirectoryError, DroppedCommand, HandlerError, HandlerResult};
use crate::handlers::{Handler, settle};
use crate::metrics;
use crate::state::{Channel, Session, User};

/// Handler for `JOIN <channel>{,<channel>} [<key>{,<key>}]`.
///
/// Keys pair with channels by position; a channel without one is joined
/// with the empty key.
pub struct JoinHandler;

impl Handler for JoinHandler {
    fn handle(&self, session: &mut Session, msg: &Message) -> HandlerResult {
        let targets = msg.param(0).ok_or(HandlerError::NeedMoreParams)?;
        let keys: Vec<&str> = msg
            .param(1)
            .map(|keys| keys.split(',').collect())
            .unwrap_or_default();
        let user = session
            .user
            .clone()
            .ok_or_else(|| HandlerError::Internal("registered session without user".into()))?;

        for (index, name) in targets.split(',').enumerate() {
            if name.is_empty() {
                continue;
            }
            let Some(channel) = find_channel(session, name) else {
                session.send_numeric(Numeric::err_nosuchchannel(name));
                continue;
            };
            let key = keys.get(index).copied().unwrap_or_default().to_owned();
            let result = join_channel(session, channel, user.clone(), key);
            settle(session, "JOIN", result)?;
        }
        Ok(())
    }

    fn requires_registration(&self) -> bool {
        true
    }
}

fn join_channel(
    session: &mut Session,
    channel: Arc<dyn Channel>,
    user: User,
    key: String,
) -> HandlerResult {
    let target = Arc::clone(&channel);
    session.enqueue(
        async move { target.join(&user, &key).await },
        move |session, result| match result {
            Ok(()) => {
                let join =
                    Message::new("JOIN", vec![channel.name().to_owned()]).with_prefix(session.hostmask());
                session.send(join);
                match channel.topic() {
                    Some(topic) => session.send_numeric(Numeric::rpl_topic(channel.name(), &topic)),
                    None => session.send_numeric(Numeric::rpl_notopic(channel.name())),
                }
                send_names(session, channel, "JOIN")
            }
            Err(DirectoryError::Refused(reason)) => {
                debug!(uid = %session.uid, channel = %channel.name(), reason = %reason, "Join refused");
                metrics::record_join_refusal(reason.label());
                session.send_numeric(reason.to_numeric(channel.name()));
                Ok(())
            }
            Err(DirectoryError::Dropped(cause)) => Err(HandlerError::Dropped {
                command: "JOIN",
                cause,
            }),
            Err(DirectoryError::Failed(error)) => {
                warn!(uid = %session.uid, channel = %channel.name(), error = %error, "Join failed");
                Err(HandlerError::Dropped {
                    command: "JOIN",
                    cause: DroppedCommand::default(),
                })
            }
        },
    )
}
