//! NAMES command handler.

use std::sync::Arc;

use tinyirc_proto::{Message, Numeric};

use super::{find_channel, split_targets};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Handler, settle};
use crate::state::{Channel, Session};

/// Nick bytes per RPL_NAMREPLY line; leaves room for prefix, target and
/// channel inside 512 bytes.
const NAMES_LINE_BUDGET: usize = 400;

/// Handler for `NAMES [<channel>{,<channel>}]`.
///
/// Without arguments only `366 * :End of /NAMES list.` is sent; listing
/// every visible user is not supported. An unknown channel gets just its
/// 366.
pub struct NamesHandler;

impl Handler for NamesHandler {
    fn handle(&self, session: &mut Session, msg: &Message) -> HandlerResult {
        let Some(targets) = msg.param(0) else {
            session.send_numeric(Numeric::rpl_endofnames("*"));
            return Ok(());
        };

        for name in split_targets(targets) {
            match find_channel(session, name) {
                Some(channel) => {
                    let result = send_names(session, channel, "NAMES");
                    settle(session, "NAMES", result)?;
                }
                None => session.send_numeric(Numeric::rpl_endofnames(name)),
            }
        }
        Ok(())
    }

    fn requires_registration(&self) -> bool {
        true
    }
}

/// Fetch the member list and send RPL_NAMREPLY (if any members) and
/// RPL_ENDOFNAMES. The lines are built on the session's own task.
pub fn send_names(
    session: &mut Session,
    channel: Arc<dyn Channel>,
    command: &'static str,
) -> HandlerResult {
    let target = Arc::clone(&channel);
    session.enqueue(
        async move { target.members().await },
        move |session, result| {
            let members = result.map_err(|e| HandlerError::from_directory(command, e))?;
            let nicks: Vec<String> = members.iter().map(|member| member.nick()).collect();
            for chunk in chunk_names(&nicks) {
                session.send_numeric(Numeric::rpl_namreply(channel.name(), chunk));
            }
            session.send_numeric(Numeric::rpl_endofnames(channel.name()));
            Ok(())
        },
    )
}

fn chunk_names(nicks: &[String]) -> Vec<&[String]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut used = 0;
    for (i, nick) in nicks.iter().enumerate() {
        if i > start && used + nick.len() + 1 > NAMES_LINE_BUDGET {
            chunks.push(&nicks[start..i]);
            start = i;
            used = 0;
        }
        used += nick.len() + 1;
    }
    if start < nicks.len() {
        chunks.push(&nicks[start..]);
    }
    chunks
}
