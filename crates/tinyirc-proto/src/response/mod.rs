//! IRC numeric response codes.
//!
//! Only the numerics the server emits are listed. Each reply is built as an
//! unbound [`Numeric`] whose target (the recipient's nick) is filled in when
//! the reply is flushed.
//!
//! # Reference
//! - RFC 2812 Section 5: Replies

#![allow(non_camel_case_types)]

mod constructors;
mod numeric;

use std::fmt;

pub use self::numeric::{Numeric, WILDCARD_TARGET};

/// IRC server response code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Response {
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1,
    /// 251 - Users, invisible users and servers
    RPL_LUSERCLIENT = 251,
    /// 255 - Local clients and servers
    RPL_LUSERME = 255,
    /// 263 - Command dropped, try again
    RPL_TRYAGAIN = 263,
    /// 331 - No topic is set
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    /// 353 - Names list
    RPL_NAMREPLY = 353,
    /// 366 - End of names list
    RPL_ENDOFNAMES = 366,
    /// 372 - MOTD line
    RPL_MOTD = 372,
    /// 375 - Start of MOTD
    RPL_MOTDSTART = 375,
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376,
    /// 402 - No such server
    ERR_NOSUCHSERVER = 402,
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403,
    /// 405 - Too many channels joined
    ERR_TOOMANYCHANNELS = 405,
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421,
    /// 431 - No nickname given
    ERR_NONICKNAMEGIVEN = 431,
    /// 432 - Erroneous nickname
    ERR_ERRONEOUSNICKNAME = 432,
    /// 433 - Nickname in use
    ERR_NICKNAMEINUSE = 433,
    /// 436 - Nickname collision
    ERR_NICKCOLLISION = 436,
    /// 442 - Not on channel
    ERR_NOTONCHANNEL = 442,
    /// 451 - Not registered
    ERR_NOTREGISTERED = 451,
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461,
    /// 462 - Already registered
    ERR_ALREADYREGISTERED = 462,
    /// 471 - Channel is full (+l)
    ERR_CHANNELISFULL = 471,
    /// 473 - Invite only channel (+i)
    ERR_INVITEONLYCHAN = 473,
    /// 474 - Banned from channel (+b)
    ERR_BANNEDFROMCHAN = 474,
    /// 475 - Bad channel key (+k)
    ERR_BADCHANNELKEY = 475,
}

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Creates a Response from a numeric code
    pub fn from_code(code: u16) -> Option<Response> {
        use Response::*;
        [
            RPL_WELCOME,
            RPL_LUSERCLIENT,
            RPL_LUSERME,
            RPL_TRYAGAIN,
            RPL_NOTOPIC,
            RPL_TOPIC,
            RPL_NAMREPLY,
            RPL_ENDOFNAMES,
            RPL_MOTD,
            RPL_MOTDSTART,
            RPL_ENDOFMOTD,
            ERR_NOSUCHSERVER,
            ERR_NOSUCHCHANNEL,
            ERR_TOOMANYCHANNELS,
            ERR_UNKNOWNCOMMAND,
            ERR_NONICKNAMEGIVEN,
            ERR_ERRONEOUSNICKNAME,
            ERR_NICKNAMEINUSE,
            ERR_NICKCOLLISION,
            ERR_NOTONCHANNEL,
            ERR_NOTREGISTERED,
            ERR_NEEDMOREPARAMS,
            ERR_ALREADYREGISTERED,
            ERR_CHANNELISFULL,
            ERR_INVITEONLYCHAN,
            ERR_BANNEDFROMCHAN,
            ERR_BADCHANNELKEY,
        ]
        .into_iter()
        .find(|r| r.code() == code)
    }

    /// Returns true for 4xx/5xx error numerics.
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_and_display() {
        assert_eq!(Response::RPL_WELCOME.code(), 1);
        assert_eq!(Response::RPL_WELCOME.to_string(), "001");
        assert_eq!(Response::ERR_NICKNAMEINUSE.to_string(), "433");
    }

    #[test]
    fn from_code_roundtrip() {
        assert_eq!(Response::from_code(366), Some(Response::RPL_ENDOFNAMES));
        assert_eq!(Response::from_code(474), Some(Response::ERR_BANNEDFROMCHAN));
        assert_eq!(Response::from_code(999), None);
    }

    #[test]
    fn error_classification() {
        assert!(Response::ERR_NOTONCHANNEL.is_error());
        assert!(!Response::RPL_TRYAGAIN.is_error());
    }
}
