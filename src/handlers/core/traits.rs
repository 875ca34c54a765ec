//! The command handler trait.

use crate::error::HandlerResult;
use crate::state::Session;
use tinyirc_proto::Message;

/// A handler for one IRC command verb.
///
/// Handlers run on the connection's own task and never block. Directory
/// calls go through [`Session::enqueue`], which resumes the handler's
/// continuation on the same task.
pub trait Handler: Send + Sync {
    fn handle(&self, session: &mut Session, msg: &Message) -> HandlerResult;

    /// Whether the command is refused with ERR_NOTREGISTERED before
    /// registration completes.
    fn requires_registration(&self) -> bool {
        false
    }
}
