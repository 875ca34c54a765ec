//! PING and PONG command handlers.

use tinyirc_proto::{Message, Numeric, irc_eq};

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::Handler;
use crate::state::Session;

/// Handler for `PING <origin> [<target>]`.
///
/// Only this server answers; a foreign target is ERR_NOSUCHSERVER.
pub struct PingHandler;

impl Handler for PingHandler {
    fn handle(&self, session: &mut Session, msg: &Message) -> HandlerResult {
        let origin = msg.param(0).ok_or(HandlerError::NeedMoreParams)?;

        if let Some(target) = msg.param(1)
            && !irc_eq(target, session.server_name())
        {
            session.send_numeric(Numeric::err_nosuchserver(target));
            return Ok(());
        }

        let pong = Message::pong(session.server_name(), origin).with_prefix(session.server_prefix());
        session.send(pong);
        Ok(())
    }
}

/// Handler for PONG. Dispatch already cleared the ping latch.
pub struct PongHandler;

impl Handler for PongHandler {
    fn handle(&self, _session: &mut Session, _msg: &Message) -> HandlerResult {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::state::test_support::Harness;

    #[tokio::test]
    async fn ping_needs_origin() {
        let mut h = Harness::new();
        h.dispatch("PING").unwrap();
        assert_eq!(h.lines(), vec![":irc.test 461 * PING :Not enough parameters"]);
    }

    #[tokio::test]
    async fn ping_is_answered_before_registration() {
        let mut h = Harness::new();
        h.dispatch("PING abc").unwrap();
        h.dispatch("PING abc IRC.TEST").unwrap();
        assert_eq!(
            h.lines(),
            vec![":irc.test PONG irc.test abc", ":irc.test PONG irc.test abc"]
        );
    }

    #[tokio::test]
    async fn ping_for_other_server() {
        let mut h = Harness::new();
        h.dispatch("PING abc irc.elsewhere").unwrap();
        assert_eq!(
            h.lines(),
            vec![":irc.test 402 * irc.elsewhere :No such server"]
        );
    }

    #[tokio::test]
    async fn pong_is_silent_and_clears_ping() {
        let mut h = Harness::new();
        h.session.ping_sent.set();
        h.dispatch("PONG irc.test").unwrap();
        assert!(h.lines().is_empty());
        assert!(!h.session.ping_sent.is_set());
    }
}
